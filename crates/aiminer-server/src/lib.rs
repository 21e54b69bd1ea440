//! # aiminer-server
//!
//! HTTP front end for the brain pipeline, built on axum.
//!
//! ```rust,ignore
//! use aiminer_server::{serve, AppState, ServerConfig};
//!
//! serve(&ServerConfig::default(), AppState::new(Arc::new(pipeline))).await?;
//! ```

pub mod app;
pub mod config;
pub mod error;

pub use app::{bind, build_router, serve, AppState};
pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
