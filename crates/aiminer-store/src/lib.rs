//! # aiminer-store
//!
//! Homes for a brain state document between pipeline invocations.
//!
//! ## Overview
//!
//! The pipeline never touches storage itself. Callers that keep a document
//! across runs load it from a `DocumentStore`, process it, and save the
//! result back when a task was added.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aiminer_store::FileDocumentStore;
//! use aiminer_core::traits::DocumentStore;
//!
//! let store = FileDocumentStore::new("brain.json");
//! let document = store.load()?;
//! let outcome = pipeline.process(document)?;
//! if outcome.task_added {
//!     store.save(&outcome.document)?;
//! }
//! ```

pub mod file;
pub mod memory;

pub use file::FileDocumentStore;
pub use memory::InMemoryDocumentStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use aiminer_contracts::{document::StateDocument, error::BrainError};
    use aiminer_core::traits::{DocumentDecoder, DocumentStore};

    use super::{FileDocumentStore, InMemoryDocumentStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn sample() -> StateDocument {
        serde_json::from_value(json!({
            "rules": { "description": "Gather wood", "memoryRules": "keep it short" },
            "vision": { "chat": [ { "timestamp": 1700000000000_i64, "player": "Alex", "message": "hi" } ] },
            "memory": { "zeta": 1, "alpha": "home" },
            "tasks": [ { "id": 1, "type": "WAIT", "status": "PENDING", "createdAt": 5, "parameters": {} } ]
        }))
        .unwrap()
    }

    /// Rejects every document, to prove the store defers to its decoder.
    struct RejectingDecoder;

    impl DocumentDecoder for RejectingDecoder {
        fn decode(&self, _raw: serde_json::Value) -> aiminer_contracts::error::BrainResult<StateDocument> {
            Err(BrainError::InvalidDocument { reason: "rejected".to_string() })
        }
    }

    // ── File store ────────────────────────────────────────────────────────────

    #[test]
    fn test_file_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().join("brain.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, sample());
        assert!(!dir.path().join("brain.json.tmp").exists(), "temp file must be renamed away");
    }

    #[test]
    fn test_file_written_with_two_space_indent_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.json");
        let store = FileDocumentStore::new(&path);

        store.save(&sample()).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert!(written.starts_with("{\n  \"rules\": {\n    \"description\": \"Gather wood\""));
        let zeta = written.find("\"zeta\"").unwrap();
        let alpha = written.find("\"alpha\"").unwrap();
        assert!(zeta < alpha, "memory key order must be kept");
    }

    #[test]
    fn test_file_load_preserves_unknown_fields_nulls_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.json");
        let raw = r#"{"tasks":[],"schemaVersion":3,"memory":null,"vision":{"chat":[{"timestamp":"09:15:00","player":null}]}}"#;
        fs::write(&path, raw).unwrap();

        let store = FileDocumentStore::new(&path);
        let loaded = store.load().unwrap();

        assert_eq!(serde_json::to_string(&loaded).unwrap(), raw);
    }

    #[test]
    fn test_file_missing_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().join("absent.json"));

        match store.load() {
            Err(BrainError::Storage { path, .. }) => assert!(path.ends_with("absent.json")),
            other => panic!("expected Storage, got {other:?}"),
        }
    }

    #[test]
    fn test_file_malformed_json_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.json");
        fs::write(&path, "{ not json").unwrap();

        let result = FileDocumentStore::new(&path).load();
        assert!(matches!(result, Err(BrainError::Storage { .. })));
    }

    #[test]
    fn test_file_non_object_is_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let result = FileDocumentStore::new(&path).load();
        assert!(matches!(result, Err(BrainError::InvalidDocument { .. })));
    }

    #[test]
    fn test_file_load_uses_configured_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.json");
        fs::write(&path, "{}").unwrap();

        let store = FileDocumentStore::new(&path).with_decoder(Box::new(RejectingDecoder));
        assert!(matches!(store.load(), Err(BrainError::InvalidDocument { .. })));
    }

    // ── In-memory store ───────────────────────────────────────────────────────

    #[test]
    fn test_memory_store_counts_saves() {
        let store = InMemoryDocumentStore::default();
        assert_eq!(store.load().unwrap(), StateDocument::default());
        assert_eq!(store.revision().unwrap(), 0);

        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();

        assert_eq!(store.load().unwrap(), sample());
        assert_eq!(store.revision().unwrap(), 2);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = InMemoryDocumentStore::new(StateDocument::default());
        let handle = store.clone();

        store.save(&sample()).unwrap();

        assert_eq!(handle.load().unwrap().task_count(), 1);
    }
}
