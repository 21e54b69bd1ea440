//! Per-invocation identifiers and results.

use serde::{Deserialize, Serialize};

use crate::{document::StateDocument, task::Task};

/// Unique identifier for one pipeline invocation, carried on every log line
/// the invocation emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(pub uuid::Uuid);

impl InvocationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What one pipeline invocation hands back.
///
/// - `task_added = true`  → `task` is the appended task and `document` holds it
/// - `task_added = false` → the completion did not parse; `document` is the
///   input document, unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub document: StateDocument,
    pub task_added: bool,
    pub task: Option<Task>,
    pub processing_time_ms: u64,
    /// The trimmed completion text the parser saw.
    pub completion: String,
}
