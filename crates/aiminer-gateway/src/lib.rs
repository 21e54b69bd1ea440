//! # aiminer-gateway
//!
//! The HTTP [`InferenceGateway`](aiminer_core::traits::InferenceGateway)
//! for the brain pipeline. The model itself runs out of process in any server
//! that exposes the OpenAI-compatible `/v1/completions` endpoint.
//!
//! ```rust,ignore
//! use aiminer_gateway::{CompletionsGateway, GatewayConfig};
//!
//! let gateway = CompletionsGateway::new(GatewayConfig::default())?;
//! // Pass `Box::new(gateway)` to `aiminer_core::BrainPipeline::new(...)`.
//! ```

pub mod completions;
pub mod config;

pub use completions::CompletionsGateway;
pub use config::GatewayConfig;
