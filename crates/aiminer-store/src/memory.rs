//! In-memory implementation of `DocumentStore`.
//!
//! `InMemoryDocumentStore` keeps one document behind a `Mutex`, so it can be
//! shared across threads while callers `load()` and `save()`. Each save bumps
//! a revision counter, which tests use to observe whether a caller wrote back.

use std::sync::{Arc, Mutex};

use tracing::debug;

use aiminer_contracts::{
    document::StateDocument,
    error::{BrainError, BrainResult},
};
use aiminer_core::traits::DocumentStore;

pub(crate) struct InMemoryState {
    pub(crate) document: StateDocument,

    /// Number of completed saves (starts at 0).
    pub(crate) revision: u64,
}

/// A `DocumentStore` holding its document in process memory.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryDocumentStore {
    pub fn new(document: StateDocument) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState { document, revision: 0 })),
        }
    }

    /// How many times `save()` has replaced the document.
    pub fn revision(&self) -> BrainResult<u64> {
        Ok(self.lock()?.revision)
    }

    fn lock(&self) -> BrainResult<std::sync::MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| BrainError::Storage {
            path: "<memory>".to_string(),
            reason: format!("document store lock poisoned: {e}"),
        })
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new(StateDocument::default())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self) -> BrainResult<StateDocument> {
        Ok(self.lock()?.document.clone())
    }

    fn save(&self, document: &StateDocument) -> BrainResult<()> {
        let mut state = self.lock()?;
        state.document = document.clone();
        state.revision += 1;

        debug!(
            revision = state.revision,
            tasks = document.task_count(),
            "in-memory document saved"
        );
        Ok(())
    }
}
