//! # aiminer-core
//!
//! The synchronous brain pipeline for AIminer agents.
//!
//! This crate provides:
//! - The collaborator traits (`PromptCompiler`, `InferenceGateway`,
//!   `ResponseParser`, `DocumentDecoder`, `Clock`, `DocumentStore`)
//! - The task assembler that appends parsed tasks to a document's queue
//! - `BrainPipeline`, which wires the collaborators together in order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aiminer_core::{BrainPipeline, traits::{PromptCompiler, InferenceGateway, ResponseParser}};
//! ```

pub mod assembler;
pub mod pipeline;
pub mod traits;

pub use pipeline::BrainPipeline;
