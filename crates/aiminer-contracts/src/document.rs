//! The brain state document.
//!
//! A `StateDocument` is the unit of work handed to the pipeline: rules,
//! vision, memory, and the task queue. The document keeps the JSON object it
//! was decoded from, so key order, explicit `null`s and fields nobody here
//! models are written back exactly as they arrived. Sections are read
//! through borrowed views that treat a missing or `null` field as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BrainError, BrainResult};

/// Free-form memory entries. Key order follows the document.
pub type Memory = Map<String, Value>;

const RULES: &str = "rules";
const VISION: &str = "vision";
const MEMORY: &str = "memory";
const TASKS: &str = "tasks";

/// The full brain state for one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDocument {
    fields: Map<String, Value>,
}

impl StateDocument {
    /// Behavioural description text. The game plugin writes an object with a
    /// `description` plus auxiliary rule texts; hand-written documents often
    /// use a bare string.
    pub fn rules_description(&self) -> Option<&str> {
        match present(&self.fields, RULES)? {
            Value::String(text) => Some(text),
            rules => rules.get("description").and_then(Value::as_str),
        }
    }

    /// Chat log in document order. Empty when absent.
    pub fn chat(&self) -> Vec<ChatMessage<'_>> {
        self.vision()
            .and_then(|v| field(v, "chat"))
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(ChatMessage).collect())
            .unwrap_or_default()
    }

    /// Block vision section, if present.
    pub fn block_vision(&self) -> Option<BlockVision<'_>> {
        self.vision()
            .and_then(|v| field(v, "blockVision"))
            .map(BlockVision)
    }

    /// Visible blocks in document order. Empty when absent.
    pub fn visible_blocks(&self) -> Vec<VisibleBlock<'_>> {
        self.block_vision()
            .map(|b| b.visible_blocks())
            .unwrap_or_default()
    }

    /// Memory entries, if the section is an object.
    pub fn memory(&self) -> Option<&Memory> {
        present(&self.fields, MEMORY).and_then(Value::as_object)
    }

    /// Queued task entries, kept as raw JSON so entries written by the game
    /// side (other verbs, other statuses, extra fields) round-trip untouched.
    pub fn tasks(&self) -> &[Value] {
        present(&self.fields, TASKS)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Number of queued task entries.
    pub fn task_count(&self) -> usize {
        self.tasks().len()
    }

    /// The `id` of every queued task.
    ///
    /// Integral floats (`1.0`) count as their integer value. Ids above
    /// `i64::MAX` read as `i64::MAX`. Entries without a numeric integral id
    /// read as 0.
    pub fn task_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.tasks()
            .iter()
            .map(|task| task.get("id").map_or(0, integral_id))
    }

    /// Append a task entry, creating the queue when it is absent or `null`.
    ///
    /// The `tasks` key keeps its position when it already exists.
    pub fn push_task(&mut self, entry: Value) -> BrainResult<()> {
        match self.fields.get_mut(TASKS) {
            Some(Value::Array(tasks)) => tasks.push(entry),
            None | Some(Value::Null) => {
                self.fields.insert(TASKS.to_string(), Value::Array(vec![entry]));
            }
            Some(other) => {
                return Err(BrainError::InvalidDocument {
                    reason: format!("tasks must be an array, found {}", kind(other)),
                })
            }
        }
        Ok(())
    }

    fn vision(&self) -> Option<&Value> {
        present(&self.fields, VISION)
    }
}

// ── Section views ────────────────────────────────────────────────────────────

/// One chat entry. The plugin writes `timestamp` as formatted text, other
/// producers as epoch milliseconds, so it is exposed as raw JSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatMessage<'a>(&'a Value);

impl<'a> ChatMessage<'a> {
    pub fn timestamp(&self) -> Option<&'a Value> {
        field(self.0, "timestamp")
    }

    pub fn player(&self) -> Option<&'a Value> {
        field(self.0, "player")
    }

    pub fn message(&self) -> Option<&'a Value> {
        field(self.0, "message")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockVision<'a>(&'a Value);

impl<'a> BlockVision<'a> {
    pub fn bot_position(&self) -> Option<BotPosition<'a>> {
        field(self.0, "botPosition").map(BotPosition)
    }

    pub fn visible_blocks(&self) -> Vec<VisibleBlock<'a>> {
        field(self.0, "visibleBlocks")
            .and_then(Value::as_array)
            .map(|blocks| blocks.iter().map(VisibleBlock).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotPosition<'a>(&'a Value);

impl<'a> BotPosition<'a> {
    pub fn x(&self) -> Option<&'a Value> {
        field(self.0, "x")
    }

    pub fn y(&self) -> Option<&'a Value> {
        field(self.0, "y")
    }

    pub fn z(&self) -> Option<&'a Value> {
        field(self.0, "z")
    }

    pub fn yaw(&self) -> Option<&'a Value> {
        field(self.0, "viewDirection").and_then(|v| field(v, "yaw"))
    }

    pub fn pitch(&self) -> Option<&'a Value> {
        field(self.0, "viewDirection").and_then(|v| field(v, "pitch"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleBlock<'a>(&'a Value);

impl<'a> VisibleBlock<'a> {
    pub fn block_type(&self) -> Option<&'a Value> {
        field(self.0, "blockType")
    }

    /// A coordinate of `position` (`"x"`, `"y"` or `"z"`).
    pub fn coordinate(&self, axis: &str) -> Option<&'a Value> {
        field(self.0, "position").and_then(|p| field(p, axis))
    }

    pub fn distance(&self) -> Option<&'a Value> {
        field(self.0, "distance")
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

fn integral_id(id: &Value) -> i64 {
    if let Some(v) = id.as_i64() {
        return v;
    }
    if id.as_u64().is_some() {
        return i64::MAX;
    }
    match id.as_f64() {
        Some(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
        _ => 0,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
