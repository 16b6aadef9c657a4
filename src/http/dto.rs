//! Wire representations of tasks and errors.

use crate::task::domain::{Task, TaskKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    /// Store-assigned identifier.
    pub id_task: i64,
    /// Public identifier.
    pub uuid: Uuid,
    /// Task type.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Task text.
    pub content: String,
    /// List position.
    pub sort_order: i64,
    /// Completion flag.
    pub done: bool,
    /// Creation time, serialized as RFC 3339.
    pub date_created: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id_task: task.id().value(),
            uuid: task.uuid().into_inner(),
            kind: task.kind(),
            content: task.content().as_str().to_owned(),
            sort_order: task.sort_order().value(),
            done: task.is_done(),
            date_created: task.created_at(),
        }
    }
}

/// `{code, message}` body used for errors and the empty listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// HTTP status code of the response.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

impl MessageBody {
    /// Creates a message body.
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Health probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    /// Always `ok` while the process serves requests.
    pub status: String,
}
