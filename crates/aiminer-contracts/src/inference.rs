//! Inference request types shared by the pipeline and gateway implementations.

use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every completion request.
///
/// The defaults are the fixed configuration the prompt layout was tuned
/// against; `stop = ["\n"]` keeps the completion to a single command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
    pub echo: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 128,
            temperature: 0.7,
            top_p: 0.9,
            stop: vec!["\n".to_string()],
            echo: false,
        }
    }
}

/// One completion request: the compiled prompt plus sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub prompt: String,
    pub sampling: SamplingConfig,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>, sampling: SamplingConfig) -> Self {
        Self {
            prompt: prompt.into(),
            sampling,
        }
    }
}
