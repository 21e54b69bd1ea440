//! File-backed `DocumentStore`.
//!
//! Documents are written as two-space-indented JSON. A save goes to a sibling
//! temporary file first and is renamed over the target, so readers never see
//! a half-written document.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use aiminer_contracts::{
    document::StateDocument,
    error::{BrainError, BrainResult},
};
use aiminer_core::traits::{DocumentDecoder, DocumentStore, SerdeDecoder};

/// A `DocumentStore` backed by one JSON file (conventionally `brain.json`).
pub struct FileDocumentStore {
    path: PathBuf,
    decoder: Box<dyn DocumentDecoder>,
}

impl FileDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            decoder: Box::new(SerdeDecoder),
        }
    }

    /// Use `decoder` (for example a schema-validating one) when loading.
    pub fn with_decoder(mut self, decoder: Box<dyn DocumentDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, reason: String) -> BrainError {
        BrainError::Storage {
            path: self.path.display().to_string(),
            reason,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "brain.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStore for FileDocumentStore {
    /// Read and decode the document.
    ///
    /// I/O failures and malformed JSON are `Storage` errors; JSON that parses
    /// but is not a valid document is whatever the decoder reports
    /// (`InvalidDocument`).
    fn load(&self) -> BrainResult<StateDocument> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| self.storage_error(format!("failed to read document: {e}")))?;
        let raw: serde_json::Value = serde_json::from_str(&contents)
            .map_err(|e| self.storage_error(format!("document is not valid JSON: {e}")))?;

        let document = self.decoder.decode(raw)?;
        debug!(
            path = %self.path.display(),
            tasks = document.task_count(),
            "document loaded"
        );
        Ok(document)
    }

    fn save(&self, document: &StateDocument) -> BrainResult<()> {
        let contents = serde_json::to_string_pretty(document)
            .map_err(|e| self.storage_error(format!("failed to encode document: {e}")))?;

        let temp = self.temp_path();
        fs::write(&temp, contents)
            .map_err(|e| self.storage_error(format!("failed to write '{}': {e}", temp.display())))?;
        fs::rename(&temp, &self.path)
            .map_err(|e| self.storage_error(format!("failed to replace document: {e}")))?;

        info!(
            path = %self.path.display(),
            tasks = document.task_count(),
            "document saved"
        );
        Ok(())
    }
}
