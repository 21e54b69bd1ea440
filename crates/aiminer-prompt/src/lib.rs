//! # aiminer-prompt
//!
//! Prompt compilation for the AIminer brain pipeline.
//!
//! [`TemplateCompiler`] implements the
//! [`PromptCompiler`](aiminer_core::traits::PromptCompiler) trait. It is a
//! pure function of the state document and its [`PromptConfig`] windows.
//!
//! ```rust,ignore
//! use aiminer_prompt::{PromptConfig, TemplateCompiler};
//!
//! let compiler = TemplateCompiler::new(PromptConfig::default());
//! // Pass `Box::new(compiler)` to `aiminer_core::BrainPipeline::new(...)`.
//! ```

pub mod config;
pub mod render;
pub mod template;

pub use config::PromptConfig;
pub use template::TemplateCompiler;
