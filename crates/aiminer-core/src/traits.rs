//! Collaborator traits for the brain pipeline.
//!
//! The pipeline is wired from these seams:
//!
//! - `PromptCompiler`: state document → prompt text (pure)
//! - `InferenceGateway`: prompt → completion (external, may block or fail)
//! - `ResponseParser`: completion → optional task (pure, total)
//! - `DocumentDecoder`: raw JSON → typed document (input validation)
//! - `Clock`: creation timestamps for queued tasks
//! - `DocumentStore`: where a caller keeps its document between runs
//!
//! Every collaborator is injected; nothing is held in global state, so tests
//! substitute deterministic fakes for all of them.

use aiminer_contracts::{
    document::StateDocument,
    error::{BrainError, BrainResult},
    inference::InferenceRequest,
    task::Task,
};

/// Renders a state document into the text prompt sent to the model.
pub trait PromptCompiler: Send + Sync {
    /// Compile `document` into a prompt.
    ///
    /// Must never fail: missing sections render as placeholder text. Calling
    /// it twice on the same document yields identical text.
    fn compile(&self, document: &StateDocument) -> String;
}

/// Maps a raw completion onto the closed action grammar.
pub trait ResponseParser: Send + Sync {
    /// Parse `completion` into a `PENDING` task with placeholder id and
    /// timestamp, or `None` when it does not match the grammar.
    ///
    /// Must be total: any input yields a valid task or `None`, never a panic.
    fn parse(&self, completion: &str) -> Option<Task>;
}

/// The language model behind the pipeline.
///
/// Implementations are not expected to be deterministic (sampling runs with
/// temperature > 0). The pipeline awaits `infer` to completion before parsing.
pub trait InferenceGateway: Send + Sync {
    /// True when the gateway can accept a request right now.
    fn is_ready(&self) -> bool;

    /// Run one completion.
    ///
    /// Return `BrainError::GatewayUnavailable` when the backend cannot be
    /// reached and `BrainError::Inference` when it fails mid-call.
    fn infer(&self, request: &InferenceRequest) -> BrainResult<String>;

    /// Short human-readable description (endpoint, model) for logs and health
    /// output.
    fn describe(&self) -> String {
        "inference gateway".to_string()
    }
}

/// Turns raw JSON into a typed state document.
pub trait DocumentDecoder: Send + Sync {
    /// Decode `raw`, returning `BrainError::InvalidDocument` when it is not a
    /// structurally valid document.
    fn decode(&self, raw: serde_json::Value) -> BrainResult<StateDocument>;
}

/// Decoder with no structural checks: any JSON object decodes, and sections
/// of an unexpected shape read as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeDecoder;

impl DocumentDecoder for SerdeDecoder {
    fn decode(&self, raw: serde_json::Value) -> BrainResult<StateDocument> {
        if !raw.is_object() {
            return Err(BrainError::InvalidDocument {
                reason: "state document must be a JSON object".to_string(),
            });
        }
        serde_json::from_value(raw).map_err(|e| BrainError::InvalidDocument {
            reason: e.to_string(),
        })
    }
}

/// Source of task creation timestamps.
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time from the system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Persistent home of a state document between invocations.
///
/// The pipeline itself never touches storage; callers that load, process and
/// save the same document must serialize those steps themselves.
pub trait DocumentStore: Send + Sync {
    /// Load the current document.
    fn load(&self) -> BrainResult<StateDocument>;

    /// Replace the stored document with `document`.
    fn save(&self, document: &StateDocument) -> BrainResult<()>;
}
