//! Task types: the closed action vocabulary and the queued task record.
//!
//! A `Task` carries a typed `Action`, so a task whose parameters do not match
//! its verb cannot be constructed. On the wire it is the flat record the game
//! side consumes:
//!
//! ```json
//! { "id": 8, "type": "MOVE_TO", "status": "PENDING", "createdAt": 1700000000000,
//!   "parameters": { "x": 10, "y": 64, "z": -5 } }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::BrainError;

/// The action verbs a completion may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    MineWood,
    MineStone,
    MoveTo,
    Chat,
    GetInventory,
    GetPosition,
    Wait,
}

impl TaskType {
    /// Every verb, in the order the prompt lists them.
    pub const ALL: [TaskType; 7] = [
        TaskType::MineWood,
        TaskType::MineStone,
        TaskType::MoveTo,
        TaskType::Chat,
        TaskType::GetInventory,
        TaskType::GetPosition,
        TaskType::Wait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MineWood => "MINE_WOOD",
            Self::MineStone => "MINE_STONE",
            Self::MoveTo => "MOVE_TO",
            Self::Chat => "CHAT",
            Self::GetInventory => "GET_INVENTORY",
            Self::GetPosition => "GET_POSITION",
            Self::Wait => "WAIT",
        }
    }

    /// Look up a verb by its exact (upper-case) spelling.
    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == verb)
    }

    /// One-line description shown to the model.
    pub fn summary(self) -> &'static str {
        match self {
            Self::MineWood => "Mine wood at a specific location",
            Self::MineStone => "Mine stone at a specific location",
            Self::MoveTo => "Move to a specific location",
            Self::Chat => "Send a chat message",
            Self::GetInventory => "Check your current inventory",
            Self::GetPosition => "Get your exact position",
            Self::Wait => "Do nothing and wait",
        }
    }

    /// The command format shown to the model.
    pub fn usage(self) -> &'static str {
        match self {
            Self::MineWood => "MINE_WOOD x y z",
            Self::MineStone => "MINE_STONE x y z",
            Self::MoveTo => "MOVE_TO x y z",
            Self::Chat => "CHAT <message>",
            Self::GetInventory => "GET_INVENTORY",
            Self::GetPosition => "GET_POSITION",
            Self::Wait => "WAIT",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a queued task. The pipeline only ever creates `Pending`;
/// the game-side executor moves tasks through the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// A block position named by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coordinates {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// A verb together with the parameters its contract requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MineWood(Coordinates),
    MineStone(Coordinates),
    MoveTo(Coordinates),
    Chat { message: String },
    GetInventory,
    GetPosition,
    Wait,
}

impl Action {
    pub fn task_type(&self) -> TaskType {
        match self {
            Action::MineWood(_) => TaskType::MineWood,
            Action::MineStone(_) => TaskType::MineStone,
            Action::MoveTo(_) => TaskType::MoveTo,
            Action::Chat { .. } => TaskType::Chat,
            Action::GetInventory => TaskType::GetInventory,
            Action::GetPosition => TaskType::GetPosition,
            Action::Wait => TaskType::Wait,
        }
    }

    /// Build an action from a verb and coordinates. `None` for verbs that do
    /// not take coordinates.
    pub fn at(task_type: TaskType, coords: Coordinates) -> Option<Self> {
        match task_type {
            TaskType::MineWood => Some(Action::MineWood(coords)),
            TaskType::MineStone => Some(Action::MineStone(coords)),
            TaskType::MoveTo => Some(Action::MoveTo(coords)),
            _ => None,
        }
    }

    /// The `parameters` object for this action.
    pub fn parameters(&self) -> Map<String, Value> {
        let value = match self {
            Action::MineWood(c) | Action::MineStone(c) | Action::MoveTo(c) => {
                json!({ "x": c.x, "y": c.y, "z": c.z })
            }
            Action::Chat { message } => json!({ "message": message }),
            Action::GetInventory | Action::GetPosition | Action::Wait => json!({}),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Rebuild an action from its wire parts, checking that `parameters`
    /// has exactly the shape `task_type` requires.
    pub fn from_parts(task_type: TaskType, parameters: Map<String, Value>) -> Result<Self, BrainError> {
        let invalid = |reason: String| BrainError::InvalidTask {
            reason: format!("{task_type}: {reason}"),
        };

        match task_type {
            TaskType::MineWood | TaskType::MineStone | TaskType::MoveTo => {
                let coords: Coordinates = serde_json::from_value(Value::Object(parameters))
                    .map_err(|e| invalid(format!("parameters must be {{x, y, z}} integers ({e})")))?;
                Action::at(task_type, coords)
                    .ok_or_else(|| invalid("verb does not take coordinates".to_string()))
            }
            TaskType::Chat => {
                let message = match parameters.get("message") {
                    Some(Value::String(m)) if !m.is_empty() && parameters.len() == 1 => m.clone(),
                    _ => return Err(invalid("parameters must be {message} with a non-empty string".to_string())),
                };
                Ok(Action::Chat { message })
            }
            TaskType::GetInventory | TaskType::GetPosition | TaskType::Wait => {
                if !parameters.is_empty() {
                    return Err(invalid("verb takes no parameters".to_string()));
                }
                Ok(match task_type {
                    TaskType::GetInventory => Action::GetInventory,
                    TaskType::GetPosition => Action::GetPosition,
                    _ => Action::Wait,
                })
            }
        }
    }
}

/// One unit of work for the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaskRecord", try_from = "TaskRecord")]
pub struct Task {
    pub id: i64,
    pub action: Action,
    pub status: TaskStatus,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// A fresh `PENDING` task with placeholder id and timestamp; the assembler
    /// fills both in when the task is queued.
    pub fn pending(action: Action) -> Self {
        Self {
            id: 0,
            action,
            status: TaskStatus::Pending,
            created_at: 0,
        }
    }

    pub fn task_type(&self) -> TaskType {
        self.action.task_type()
    }
}

/// Wire shape of a `Task`.
#[derive(Serialize, Deserialize)]
struct TaskRecord {
    id: i64,
    #[serde(rename = "type")]
    task_type: TaskType,
    status: TaskStatus,
    #[serde(rename = "createdAt")]
    created_at: i64,
    #[serde(default)]
    parameters: Map<String, Value>,
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            task_type: task.action.task_type(),
            status: task.status,
            created_at: task.created_at,
            parameters: task.action.parameters(),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = BrainError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            action: Action::from_parts(record.task_type, record.parameters)?,
            status: record.status,
            created_at: record.created_at,
        })
    }
}
