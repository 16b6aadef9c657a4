//! Domain model for the ordered task list.
//!
//! The domain holds the task record, its validated scalar types, and the two
//! write shapes the store accepts: the full [`NewTask`] for inserts and the
//! sparse [`TaskChanges`] for updates. Infrastructure concerns stay outside
//! this boundary.

mod error;
mod ids;
mod task;

pub use error::{ParseTaskKindError, TaskValidationError};
pub use ids::{SortOrder, TaskContent, TaskId, TaskUuid};
pub use task::{NewTask, PersistedTask, Task, TaskChanges, TaskKind};
