//! Error taxonomy for the AIminer brain pipeline.
//!
//! A completion the parser cannot map to a task is NOT an error: it is the
//! `task_added = false` outcome. Only resource and input faults surface here.

use thiserror::Error;

/// The unified error type for the brain crates.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The inference gateway is not reachable or not ready.
    ///
    /// Retryable by the caller; the pipeline never retries on its own.
    #[error("inference gateway unavailable: {reason}")]
    GatewayUnavailable { reason: String },

    /// The gateway accepted the request but failed to produce a completion.
    #[error("inference failed: {reason}")]
    Inference { reason: String },

    /// The state document is structurally invalid (not an object, or a
    /// section has the wrong JSON type).
    #[error("invalid state document: {reason}")]
    InvalidDocument { reason: String },

    /// A task record does not satisfy its verb's parameter contract.
    #[error("invalid task: {reason}")]
    InvalidTask { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Reading or writing a persisted state document failed.
    #[error("storage error at '{path}': {reason}")]
    Storage { path: String, reason: String },

    /// The document validation schema itself could not be compiled.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A value could not be encoded as JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl BrainError {
    /// True for conditions a caller may reasonably retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BrainError::GatewayUnavailable { .. })
    }
}

/// Convenience alias used throughout the brain crates.
pub type BrainResult<T> = Result<T, BrainError>;
