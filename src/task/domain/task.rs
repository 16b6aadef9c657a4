//! Task record and the write shapes derived from it.

use super::{ParseTaskKindError, SortOrder, TaskContent, TaskId, TaskUuid, TaskValidationError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Something to buy.
    Shopping,
    /// Something to do at work.
    Work,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shopping => "shopping",
            Self::Work => "work",
        }
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = ParseTaskKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "shopping" => Ok(Self::Shopping),
            "work" => Ok(Self::Work),
            _ => Err(ParseTaskKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    uuid: TaskUuid,
    kind: TaskKind,
    content: TaskContent,
    sort_order: SortOrder,
    done: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTask {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Public identifier generated at creation.
    pub uuid: TaskUuid,
    /// Task type.
    pub kind: TaskKind,
    /// Task text.
    pub content: TaskContent,
    /// List position.
    pub sort_order: SortOrder,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTask) -> Self {
        Self {
            id: data.id,
            uuid: data.uuid,
            kind: data.kind,
            content: data.content,
            sort_order: data.sort_order,
            done: data.done,
            created_at: data.created_at,
        }
    }

    /// Returns the store-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the public identifier.
    #[must_use]
    pub const fn uuid(&self) -> TaskUuid {
        self.uuid
    }

    /// Returns the task type.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the task text.
    #[must_use]
    pub const fn content(&self) -> &TaskContent {
        &self.content
    }

    /// Returns the list position.
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Returns whether the task is done.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns a copy of this task with `changes` applied.
    ///
    /// Identity and creation metadata are never touched.
    #[must_use]
    pub fn with_changes(&self, changes: &TaskChanges) -> Self {
        Self {
            kind: changes.kind.unwrap_or(self.kind),
            content: changes
                .content
                .clone()
                .unwrap_or_else(|| self.content.clone()),
            sort_order: changes.sort_order.unwrap_or(self.sort_order),
            done: changes.done.unwrap_or(self.done),
            ..self.clone()
        }
    }

    /// Moves the task one position up.
    ///
    /// Returns `None` when the position would overflow.
    #[must_use]
    pub fn shifted_up(&self) -> Option<Self> {
        let sort_order = self.sort_order.next()?;
        Some(Self {
            sort_order,
            ..self.clone()
        })
    }
}

/// Sparse set of updatable task fields.
///
/// `None` means "not supplied": the field is left untouched by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New task type.
    pub kind: Option<TaskKind>,
    /// New task text.
    pub content: Option<TaskContent>,
    /// New list position.
    pub sort_order: Option<SortOrder>,
    /// New completion flag.
    pub done: Option<bool>,
}

impl TaskChanges {
    /// Returns `true` when no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.content.is_none()
            && self.sort_order.is_none()
            && self.done.is_none()
    }
}

/// Insertable task carrying every column the store writes on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    uuid: TaskUuid,
    kind: TaskKind,
    content: TaskContent,
    sort_order: SortOrder,
    done: bool,
    created_at: DateTime<Utc>,
}

impl NewTask {
    /// Assembles an insertable task from validated changes.
    ///
    /// A fresh UUID is generated and the creation time is read from `clock`.
    /// `done` defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskValidationError`] of the first required field that
    /// is missing, checked in the order content, type, sort order.
    pub fn from_changes(
        changes: TaskChanges,
        clock: &impl Clock,
    ) -> Result<Self, TaskValidationError> {
        let TaskChanges {
            kind,
            content,
            sort_order,
            done,
        } = changes;
        let content = content.ok_or(TaskValidationError::EmptyContent)?;
        let kind = kind.ok_or_else(|| TaskValidationError::InvalidKind(String::new()))?;
        let sort_order = sort_order.ok_or(TaskValidationError::InvalidSortOrder)?;

        Ok(Self {
            uuid: TaskUuid::generate(),
            kind,
            content,
            sort_order,
            done: done.unwrap_or(false),
            created_at: clock.utc(),
        })
    }

    /// Returns the generated public identifier.
    #[must_use]
    pub const fn uuid(&self) -> TaskUuid {
        self.uuid
    }

    /// Returns the task type.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the task text.
    #[must_use]
    pub const fn content(&self) -> &TaskContent {
        &self.content
    }

    /// Returns the requested list position.
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Returns the initial completion flag.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Materializes the persisted task once the store has assigned `id`.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task::from_persisted(PersistedTask {
            id,
            uuid: self.uuid,
            kind: self.kind,
            content: self.content,
            sort_order: self.sort_order,
            done: self.done,
            created_at: self.created_at,
        })
    }
}
