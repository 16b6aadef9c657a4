//! Inbound task payloads and their structural validation.
//!
//! A payload keeps every field as loosely typed JSON so that a wrongly typed
//! value surfaces as a [`TaskValidationError`] naming the field instead of a
//! decode failure. Each write form then checks the fields it needs, in its
//! own order, and produces a typed [`TaskChanges`].

use crate::task::domain::{SortOrder, TaskChanges, TaskContent, TaskKind, TaskValidationError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A field that may be absent, explicitly `null`, or set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not supplied.
    Absent,
    /// The key was supplied with `null`.
    Null,
    /// The key was supplied with a value.
    Value(T),
}

impl<T> Patch<T> {
    /// Returns `true` when the key was not supplied.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    // Only called for keys that are present; missing keys fall back to
    // `Default`, which is `Absent`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Self::Null, Self::Value))
    }
}

/// Task fields as supplied by a client.
///
/// Unknown keys, including `id`, `uuid` and `date_created`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaskPayload {
    #[serde(rename = "type")]
    kind: Patch<Value>,
    content: Patch<Value>,
    sort_order: Patch<Value>,
    done: Patch<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

impl TaskPayload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task type.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<Value>) -> Self {
        self.kind = Patch::Value(kind.into());
        self
    }

    /// Sets the task content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<Value>) -> Self {
        self.content = Patch::Value(content.into());
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: impl Into<Value>) -> Self {
        self.sort_order = Patch::Value(sort_order.into());
        self
    }

    /// Sets the done flag.
    #[must_use]
    pub fn with_done(mut self, done: impl Into<Value>) -> Self {
        self.done = Patch::Value(done.into());
        self
    }

    /// Validates the payload for a create.
    ///
    /// Content, type and sort order are required; done is optional.
    ///
    /// # Errors
    ///
    /// Returns the first failing check in the order content, type, sort
    /// order, done.
    pub fn into_create_changes(self) -> Result<TaskChanges, TaskValidationError> {
        let content = parse_content(self.content, Presence::Required)?;
        let kind = parse_kind(self.kind, Presence::Required)?;
        let sort_order = parse_sort_order(self.sort_order, Presence::Required)?;
        let done = parse_done(self.done, Presence::Optional)?;
        Ok(TaskChanges {
            kind,
            content,
            sort_order,
            done,
        })
    }

    /// Validates the payload for a full update, where every field is
    /// required.
    ///
    /// # Errors
    ///
    /// Returns the first failing check in the order sort order, done,
    /// content, type.
    pub fn into_full_changes(self) -> Result<TaskChanges, TaskValidationError> {
        let sort_order = parse_sort_order(self.sort_order, Presence::Required)?;
        let done = parse_done(self.done, Presence::Required)?;
        let content = parse_content(self.content, Presence::Required)?;
        let kind = parse_kind(self.kind, Presence::Required)?;
        Ok(TaskChanges {
            kind,
            content,
            sort_order,
            done,
        })
    }

    /// Validates the payload for a partial update. Only supplied fields are
    /// checked.
    ///
    /// # Errors
    ///
    /// Returns the first failing check in the order content, type, sort
    /// order, done.
    pub fn into_partial_changes(self) -> Result<TaskChanges, TaskValidationError> {
        let content = parse_content(self.content, Presence::Optional)?;
        let kind = parse_kind(self.kind, Presence::Optional)?;
        let sort_order = parse_sort_order(self.sort_order, Presence::Optional)?;
        let done = parse_done(self.done, Presence::Optional)?;
        Ok(TaskChanges {
            kind,
            content,
            sort_order,
            done,
        })
    }
}

/// Resolves absence and `null` for one field, then parses a present value.
///
/// Every task column is non-nullable, so `null` is always rejected.
fn parse_field<T>(
    field: Patch<Value>,
    presence: Presence,
    rejected: impl FnOnce(Option<&Value>) -> TaskValidationError,
    parse: impl FnOnce(Value) -> Result<T, TaskValidationError>,
) -> Result<Option<T>, TaskValidationError> {
    if field.is_absent() && presence == Presence::Optional {
        return Ok(None);
    }
    match field {
        Patch::Value(value) => parse(value).map(Some),
        Patch::Absent | Patch::Null => Err(rejected(None)),
    }
}

fn parse_content(
    field: Patch<Value>,
    presence: Presence,
) -> Result<Option<TaskContent>, TaskValidationError> {
    parse_field(
        field,
        presence,
        |_| TaskValidationError::EmptyContent,
        |value| match value {
            Value::String(text) => TaskContent::new(text),
            _ => Err(TaskValidationError::EmptyContent),
        },
    )
}

fn parse_kind(
    field: Patch<Value>,
    presence: Presence,
) -> Result<Option<TaskKind>, TaskValidationError> {
    parse_field(
        field,
        presence,
        |value| TaskValidationError::InvalidKind(value.map(Value::to_string).unwrap_or_default()),
        |value| match value {
            Value::String(text) => TaskKind::try_from(text.as_str()).map_err(Into::into),
            other => Err(TaskValidationError::InvalidKind(other.to_string())),
        },
    )
}

fn parse_sort_order(
    field: Patch<Value>,
    presence: Presence,
) -> Result<Option<SortOrder>, TaskValidationError> {
    parse_field(
        field,
        presence,
        |_| TaskValidationError::InvalidSortOrder,
        |value| {
            let number = match value {
                Value::Number(number) => number.as_i64(),
                Value::String(text) => text.trim().parse::<i64>().ok(),
                _ => None,
            };
            number
                .map(SortOrder::new)
                .ok_or(TaskValidationError::InvalidSortOrder)
        },
    )
}

fn parse_done(field: Patch<Value>, presence: Presence) -> Result<Option<bool>, TaskValidationError> {
    parse_field(
        field,
        presence,
        |_| TaskValidationError::InvalidDone,
        |value| match value {
            Value::Bool(flag) => Ok(flag),
            _ => Err(TaskValidationError::InvalidDone),
        },
    )
}
