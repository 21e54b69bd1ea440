//! Listen address for the HTTP service.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;

/// `host` is an IP address or a hostname such as `localhost`; it is resolved
/// when the listener binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` as written in the configuration, for logs and errors.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
