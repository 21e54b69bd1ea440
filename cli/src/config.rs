//! Configuration for the `aiminer-brain` binary.
//!
//! Precedence, lowest first: built-in defaults, `aiminer.toml`, environment
//! variables, command-line flags. Every field has a default, so an empty file
//! (or no file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use aiminer_contracts::error::{BrainError, BrainResult};
use aiminer_gateway::GatewayConfig;
use aiminer_prompt::PromptConfig;
use aiminer_server::ServerConfig;
use aiminer_verify::ParserConfig;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "aiminer.toml";

pub const ENV_GATEWAY_URL: &str = "AIMINER_GATEWAY_URL";
pub const ENV_MODEL: &str = "AIMINER_MODEL";
pub const ENV_HOST: &str = "AIMINER_HOST";
pub const ENV_PORT: &str = "AIMINER_PORT";

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// `[gateway]` section.
    pub gateway: GatewayConfig,

    /// `[server]` section.
    pub server: ServerConfig,

    /// `[prompt]` section.
    pub prompt: PromptConfig,

    /// `[parser]` section.
    pub parser: ParserConfig,
}

impl BrainConfig {
    pub fn from_toml_str(s: &str) -> BrainResult<Self> {
        toml::from_str(s).map_err(|e| BrainError::ConfigError {
            reason: format!("failed to parse configuration TOML: {e}"),
        })
    }

    /// Load from `path`, or from `aiminer.toml` in the working directory when
    /// it exists, or fall back to defaults.
    ///
    /// An explicitly named file that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> BrainResult<Self> {
        let path = match path {
            Some(p) => p,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };

        let contents = std::fs::read_to_string(path).map_err(|e| BrainError::ConfigError {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply `AIMINER_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> BrainResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `AIMINER_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> BrainResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_GATEWAY_URL) {
            self.gateway.base_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.gateway.model = model;
        }
        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|e| BrainError::ConfigError {
                reason: format!("{ENV_PORT}='{port}' is not a valid port: {e}"),
            })?;
        }
        Ok(())
    }
}
