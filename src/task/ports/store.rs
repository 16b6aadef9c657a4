//! Store port for task persistence and ordering maintenance.
//!
//! Reads and deletes run directly against the store. Every write that takes
//! part in sort-order conflict resolution runs on a [`TaskTransaction`]
//! handle obtained from [`TaskStore::begin_transaction`], so a conflict
//! check, a shift and the write it makes room for always share one
//! transaction boundary.

use crate::task::domain::{NewTask, SortOrder, Task, TaskChanges, TaskId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StorageError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task ordered by ascending sort order.
    ///
    /// Ties, which only arise from concurrent writers, are broken by id.
    async fn list_all(&self) -> StoreResult<Vec<Task>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn get_by_id(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Deletes a task.
    ///
    /// Returns `false` when no row matched `id`.
    async fn remove(&self, id: TaskId) -> StoreResult<bool>;

    /// Opens a transaction.
    ///
    /// The handle must be finished with [`TaskTransaction::commit`] or
    /// [`TaskTransaction::rollback`]. A handle dropped unfinished is
    /// discarded without publishing any of its writes.
    async fn begin_transaction(&self) -> StoreResult<Box<dyn TaskTransaction>>;
}

/// Writes executed inside one store transaction.
#[async_trait]
pub trait TaskTransaction: Send {
    /// Returns whether a row other than `exclude` occupies `order`.
    async fn has_sort_order(
        &mut self,
        order: SortOrder,
        exclude: Option<TaskId>,
    ) -> StoreResult<bool>;

    /// Moves every row with `sort_order >= order` up by one.
    ///
    /// Rows are processed from the highest position downward so no
    /// intermediate state holds a duplicate. Returns the number of rows
    /// moved.
    async fn shift_sort_orders_from(&mut self, order: SortOrder) -> StoreResult<u64>;

    /// Inserts a task and returns the identifier assigned by the store.
    async fn create(&mut self, task: &NewTask) -> StoreResult<TaskId>;

    /// Writes the supplied fields of `changes` to the task `id`.
    ///
    /// Fields left `None` are not written. Returns `false` when no row
    /// matched `id`.
    async fn update(&mut self, id: TaskId, changes: &TaskChanges) -> StoreResult<bool>;

    /// Publishes every write made through this handle.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discards every write made through this handle.
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Store operation names used in error reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Acquiring a connection.
    Connect,
    /// Listing every task.
    ListAll,
    /// Fetching a task by id.
    GetById,
    /// Inserting a task.
    Create,
    /// Updating a task.
    Update,
    /// Deleting a task.
    Remove,
    /// Checking a sort order for a conflict.
    HasSortOrder,
    /// Shifting sort orders up.
    ShiftSortOrders,
    /// Opening a transaction.
    Begin,
    /// Committing a transaction.
    Commit,
    /// Rolling back a transaction.
    Rollback,
    /// Applying the task schema.
    EnsureSchema,
}

impl StoreOperation {
    /// Returns the operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::ListAll => "list_all",
            Self::GetById => "get_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::HasSortOrder => "has_sort_order",
            Self::ShiftSortOrders => "shift_sort_orders_from",
            Self::Begin => "begin_transaction",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
            Self::EnsureSchema => "ensure_schema",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datastore-level failure.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed{}: {source}", code_suffix(.code.as_deref()))]
pub struct StorageError {
    operation: StoreOperation,
    code: Option<String>,
    source: Arc<dyn std::error::Error + Send + Sync>,
}

fn code_suffix(code: Option<&str>) -> String {
    code.map(|value| format!(" [{value}]")).unwrap_or_default()
}

impl StorageError {
    /// Wraps a datastore error raised by `operation`.
    pub fn new(
        operation: StoreOperation,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            operation,
            code: None,
            source: Arc::new(err),
        }
    }

    /// Wraps a failure described only by a message.
    pub fn message(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, std::io::Error::other(message.into()))
    }

    /// Attaches the driver-level error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the failed operation.
    #[must_use]
    pub const fn operation(&self) -> StoreOperation {
        self.operation
    }

    /// Returns the driver-level error code, when known.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}
