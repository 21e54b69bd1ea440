//! Connection settings for the completion server.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234";
pub const DEFAULT_MODEL: &str = "local-model";

/// Where the completion server lives and how long to wait for it.
///
/// Example in TOML:
/// ```toml
/// [gateway]
/// base_url = "http://127.0.0.1:1234"
/// model = "local-model"
/// connect_timeout_secs = 10
/// request_timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server root, without the `/v1` suffix.
    pub base_url: String,

    /// Model name sent with every request. Single-model servers ignore it.
    pub model: String,

    /// Sent as a bearer token when set.
    pub api_key: Option<String>,

    pub connect_timeout_secs: u64,

    /// Upper bound for a whole completion request, generation included.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}
