//! Structural validation of incoming state documents.
//!
//! `SchemaDocumentDecoder` implements the `DocumentDecoder` trait from
//! `aiminer-core`. Raw JSON is checked against a JSON Schema first, so every
//! violation is reported in one pass with its instance path, and is then
//! decoded into a `StateDocument`.

use serde_json::{json, Value};
use tracing::{debug, warn};

use aiminer_contracts::{
    document::StateDocument,
    error::{BrainError, BrainResult},
};
use aiminer_core::traits::{DocumentDecoder, SerdeDecoder};

/// The shape a state document must have before decoding.
///
/// Sections are optional and may be `null`. Unknown keys are allowed at
/// every level.
pub fn document_schema() -> Value {
    let number = json!({ "type": ["number", "null"] });
    let text = json!({ "type": ["string", "null"] });
    let stamp = json!({ "type": ["number", "string", "null"] });
    let point = json!({
        "type": ["object", "null"],
        "properties": { "x": number, "y": number, "z": number }
    });

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "AIminer brain state document",
        "type": "object",
        "properties": {
            "rules": {
                "type": ["string", "object", "null"],
                "properties": { "description": text }
            },
            "vision": {
                "type": ["object", "null"],
                "properties": {
                    "chat": {
                        "type": ["array", "null"],
                        "items": {
                            "type": "object",
                            "properties": {
                                "timestamp": stamp,
                                "player": text,
                                "message": text
                            }
                        }
                    },
                    "blockVision": {
                        "type": ["object", "null"],
                        "properties": {
                            "botPosition": {
                                "type": ["object", "null"],
                                "properties": {
                                    "x": number,
                                    "y": number,
                                    "z": number,
                                    "viewDirection": {
                                        "type": ["object", "null"],
                                        "properties": { "yaw": number, "pitch": number }
                                    }
                                }
                            },
                            "visibleBlocks": {
                                "type": ["array", "null"],
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "blockType": text,
                                        "position": point,
                                        "distance": number
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "memory": { "type": ["object", "null"] },
            "tasks": {
                "type": ["array", "null"],
                "items": { "type": "object" }
            }
        }
    })
}

/// A `DocumentDecoder` that validates against a JSON Schema before decoding.
pub struct SchemaDocumentDecoder {
    validator: jsonschema::Validator,
}

impl SchemaDocumentDecoder {
    /// Build a decoder for the built-in [`document_schema`].
    pub fn new() -> BrainResult<Self> {
        Self::with_schema(&document_schema())
    }

    /// Build a decoder for a caller-supplied schema.
    ///
    /// Returns `BrainError::SchemaValidation` if `schema` is not a valid
    /// JSON Schema document.
    pub fn with_schema(schema: &Value) -> BrainResult<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| {
            warn!(error = %e, "document schema failed to compile");
            BrainError::SchemaValidation {
                reason: format!("invalid JSON Schema document: {e}"),
            }
        })?;
        Ok(Self { validator })
    }

    /// Every schema violation in `raw`, as `"<instance path>: <message>"`.
    pub fn violations(&self, raw: &Value) -> Vec<String> {
        self.validator
            .iter_errors(raw)
            .map(|error| {
                let path = error.instance_path.to_string();
                let path = if path.is_empty() { "/".to_string() } else { path };
                format!("{path}: {error}")
            })
            .collect()
    }
}

impl DocumentDecoder for SchemaDocumentDecoder {
    fn decode(&self, raw: Value) -> BrainResult<StateDocument> {
        let violations = self.violations(&raw);
        if !violations.is_empty() {
            let reason = violations.join("; ");
            warn!(violations = violations.len(), %reason, "state document failed schema validation");
            return Err(BrainError::InvalidDocument { reason });
        }

        debug!("state document passed schema validation");
        SerdeDecoder.decode(raw)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
