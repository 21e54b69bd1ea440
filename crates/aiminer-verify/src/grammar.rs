//! The closed action grammar.
//!
//! `CommandParser` implements the `ResponseParser` trait from `aiminer-core`.
//! A completion is read as:
//!
//! 1. Trim, then uppercase (the whole text, or only the verb under
//!    `ChatCasing::Preserve`).
//! 2. Split at the first run of whitespace into verb and remainder.
//! 3. Dispatch on the verb:
//!    - `MINE_WOOD` / `MINE_STONE` / `MOVE_TO`: the first three remainder
//!      tokens must be integers; further tokens are ignored.
//!    - `CHAT`: the non-empty remainder is the message, verbatim.
//!    - `GET_INVENTORY` / `GET_POSITION` / `WAIT`: trailing text is ignored.
//!
//! Anything else is rejected. Parsing never panics and never errors: the
//! result is a task or a `ParseRejection`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use aiminer_contracts::task::{Action, Coordinates, Task, TaskType};
use aiminer_core::traits::ResponseParser;

/// How the `CHAT` message keeps its casing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatCasing {
    /// The whole completion is uppercased, message included.
    #[default]
    Uppercase,
    /// Only the verb is uppercased; the message keeps the model's casing.
    Preserve,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub chat_casing: ChatCasing,
}

/// Why a completion produced no task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRejection {
    #[error("completion is empty")]
    Empty,

    #[error("unknown action verb '{verb}'")]
    UnknownVerb { verb: String },

    #[error("{verb} needs x y z coordinates")]
    MissingArguments { verb: TaskType },

    #[error("{verb} coordinate '{token}' is not an integer")]
    InvalidCoordinate { verb: TaskType, token: String },

    #[error("CHAT needs a message")]
    EmptyMessage,
}

/// A `ResponseParser` for the seven-verb action grammar.
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    config: ParserConfig,
}

impl CommandParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse `completion`, reporting why it was rejected.
    pub fn diagnose(&self, completion: &str) -> Result<Task, ParseRejection> {
        let trimmed = completion.trim();
        let text = match self.config.chat_casing {
            ChatCasing::Uppercase => trimmed.to_uppercase(),
            ChatCasing::Preserve => trimmed.to_string(),
        };

        let mut parts = text.splitn(2, char::is_whitespace);
        let verb = match parts.next() {
            Some(v) if !v.is_empty() => v.to_uppercase(),
            _ => return Err(ParseRejection::Empty),
        };
        let remainder = parts.next().map(str::trim_start).unwrap_or_default();

        let task_type =
            TaskType::from_verb(&verb).ok_or(ParseRejection::UnknownVerb { verb })?;

        let action = match task_type {
            TaskType::MineWood | TaskType::MineStone | TaskType::MoveTo => {
                let coords = coordinates(task_type, remainder)?;
                Action::at(task_type, coords).ok_or(ParseRejection::MissingArguments { verb: task_type })?
            }
            TaskType::Chat => {
                if remainder.is_empty() {
                    return Err(ParseRejection::EmptyMessage);
                }
                Action::Chat { message: remainder.to_string() }
            }
            TaskType::GetInventory => Action::GetInventory,
            TaskType::GetPosition => Action::GetPosition,
            TaskType::Wait => Action::Wait,
        };

        Ok(Task::pending(action))
    }
}

fn coordinates(verb: TaskType, remainder: &str) -> Result<Coordinates, ParseRejection> {
    let tokens: Vec<&str> = remainder.split_whitespace().take(3).collect();
    if tokens.len() < 3 {
        return Err(ParseRejection::MissingArguments { verb });
    }

    let mut values = [0i64; 3];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        *slot = token.parse().map_err(|_| ParseRejection::InvalidCoordinate {
            verb,
            token: token.to_string(),
        })?;
    }

    let [x, y, z] = values;
    Ok(Coordinates { x, y, z })
}

impl ResponseParser for CommandParser {
    fn parse(&self, completion: &str) -> Option<Task> {
        self.diagnose(completion)
            .map_err(|rejection| debug!(%rejection, "completion rejected"))
            .ok()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
