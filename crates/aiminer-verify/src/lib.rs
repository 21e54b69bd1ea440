//! # aiminer-verify
//!
//! Checks on both ends of the brain pipeline.
//!
//! - [`grammar::CommandParser`] implements
//!   [`ResponseParser`](aiminer_core::traits::ResponseParser): it maps a model
//!   completion onto the closed action grammar, or rejects it.
//! - [`schema::SchemaDocumentDecoder`] implements
//!   [`DocumentDecoder`](aiminer_core::traits::DocumentDecoder): JSON Schema
//!   validation of incoming state documents via the `jsonschema` crate.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use aiminer_verify::{CommandParser, ParserConfig, SchemaDocumentDecoder};
//!
//! let parser = CommandParser::new(ParserConfig::default());
//! let decoder = SchemaDocumentDecoder::new()?;
//! ```

pub mod grammar;
pub mod schema;

pub use grammar::{ChatCasing, CommandParser, ParseRejection, ParserConfig};
pub use schema::{document_schema, SchemaDocumentDecoder};
