//! # aiminer-contracts
//!
//! Shared types and contracts for the AIminer brain pipeline.
//!
//! All crates in the workspace import from here. No pipeline logic lives in
//! this crate: only the state document, the task vocabulary, inference
//! request types, and the error taxonomy.

pub mod document;
pub mod error;
pub mod inference;
pub mod outcome;
pub mod task;
