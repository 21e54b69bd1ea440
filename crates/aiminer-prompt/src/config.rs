//! Prompt window configuration.
//!
//! The windows bound how much of the document reaches the model: the most
//! recent chat messages and the first visible blocks. Both default to the
//! sizes the prompt layout was tuned against.
//!
//! Example in TOML:
//! ```toml
//! [prompt]
//! chat_window = 10
//! block_window = 20
//! ```

use serde::{Deserialize, Serialize};

use aiminer_contracts::error::{BrainError, BrainResult};

pub const DEFAULT_CHAT_WINDOW: usize = 10;
pub const DEFAULT_BLOCK_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Number of most recent chat messages rendered, oldest first.
    pub chat_window: usize,

    /// Number of visible blocks rendered, in document order.
    pub block_window: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            chat_window: DEFAULT_CHAT_WINDOW,
            block_window: DEFAULT_BLOCK_WINDOW,
        }
    }
}

impl PromptConfig {
    /// Parse a standalone TOML table holding `chat_window` / `block_window`.
    ///
    /// Returns `BrainError::ConfigError` if the TOML is malformed or a window
    /// is not a non-negative integer.
    pub fn from_toml_str(s: &str) -> BrainResult<Self> {
        toml::from_str(s).map_err(|e| BrainError::ConfigError {
            reason: format!("failed to parse prompt TOML: {e}"),
        })
    }
}
