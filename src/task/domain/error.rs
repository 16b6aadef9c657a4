//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
///
/// Each variant corresponds to one client-facing validation case, so callers
/// can map variants to distinct user messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskValidationError {
    /// The task content is missing, not a string, or blank after trimming.
    #[error("task content must be a non-empty string")]
    EmptyContent,

    /// The task type is missing or outside the supported enumeration.
    #[error("unsupported task type: {0}")]
    InvalidKind(String),

    /// The sort order is missing or not an integer.
    #[error("sort order must be an integer")]
    InvalidSortOrder,

    /// The done flag is missing or not a boolean.
    #[error("done must be a boolean")]
    InvalidDone,
}

/// Error returned while parsing task types from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskKindError(pub String);

impl From<ParseTaskKindError> for TaskValidationError {
    fn from(err: ParseTaskKindError) -> Self {
        Self::InvalidKind(err.0)
    }
}
