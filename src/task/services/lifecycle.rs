//! Service layer for the ordered task list.
//!
//! Every write that carries a sort order runs inside one store transaction:
//! the conflict check, the shift that makes room and the write itself either
//! all commit or all roll back.

use super::payload::TaskPayload;
use crate::task::{
    domain::{NewTask, SortOrder, Task, TaskChanges, TaskId, TaskValidationError},
    ports::{StorageError, StoreOperation, TaskStore, TaskTransaction},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Operation that looked a task up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOperation {
    /// Reading a single task.
    Get,
    /// Replacing or patching a task.
    Update,
    /// Deleting a task.
    Remove,
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Update => "update",
            Self::Remove => "remove",
        })
    }
}

/// Step of a transactional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Opening the transaction.
    Begin,
    /// Looking for a task at the requested sort order.
    ConflictCheck,
    /// Moving tasks up to free the requested sort order.
    Shift,
    /// Inserting or updating the task.
    Write,
    /// Committing the transaction.
    Commit,
    /// Reading the written task back.
    Reload,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Begin => "begin",
            Self::ConflictCheck => "conflict check",
            Self::Shift => "shift",
            Self::Write => "write",
            Self::Commit => "commit",
            Self::Reload => "reload",
        })
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The payload failed validation. Nothing was written.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    /// No task exists with the requested id.
    #[error("task {id} not found during {operation}")]
    NotFound {
        /// The operation that looked the task up.
        operation: TaskOperation,
        /// The requested id.
        id: TaskId,
    },
    /// A transactional write failed and was rolled back.
    #[error("task write failed at {stage}: {source}")]
    Internal {
        /// The step that failed.
        stage: WriteStage,
        /// The underlying store failure.
        source: StorageError,
    },
    /// A plain read or delete failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Outcome of listing every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListing {
    /// No task exists.
    Empty,
    /// Tasks ordered by ascending sort order.
    Tasks(Vec<Task>),
}

impl TaskListing {
    /// Returns the listed tasks, empty for [`TaskListing::Empty`].
    #[must_use]
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Empty => Vec::new(),
            Self::Tasks(tasks) => tasks,
        }
    }
}

/// Task list orchestration service.
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists every task by ascending sort order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Storage`] when the store read fails.
    pub async fn list(&self) -> TaskServiceResult<TaskListing> {
        let tasks = self.store.list_all().await?;
        if tasks.is_empty() {
            return Ok(TaskListing::Empty);
        }
        Ok(TaskListing::Tasks(tasks))
    }

    /// Fetches one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when no task has `id`, or
    /// [`TaskServiceError::Storage`] when the read fails.
    pub async fn get(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound {
                operation: TaskOperation::Get,
                id,
            })
    }

    /// Creates a task, shifting existing tasks up when its sort order is
    /// taken.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for an invalid payload, or
    /// [`TaskServiceError::Internal`] when any transactional step fails.
    pub async fn create(&self, payload: TaskPayload) -> TaskServiceResult<Task> {
        let changes = payload.into_create_changes()?;
        let new_task = NewTask::from_changes(changes, &*self.clock)?;

        let mut transaction = self.begin().await?;
        let outcome = insert_in_place(transaction.as_mut(), &new_task).await;
        let id = finish(transaction, outcome).await?;
        tracing::info!(
            task_id = %id,
            uuid = %new_task.uuid(),
            sort_order = %new_task.sort_order(),
            "task created"
        );

        self.store
            .get_by_id(id)
            .await
            .map_err(internal(WriteStage::Reload))?
            .ok_or_else(|| TaskServiceError::Internal {
                stage: WriteStage::Reload,
                source: StorageError::message(
                    StoreOperation::GetById,
                    format!("task {id} disappeared after commit"),
                ),
            })
    }

    /// Replaces every updatable field of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for an invalid payload,
    /// [`TaskServiceError::NotFound`] when no task has `id`, or
    /// [`TaskServiceError::Internal`] when any transactional step fails.
    pub async fn replace(&self, id: TaskId, payload: TaskPayload) -> TaskServiceResult<Task> {
        let changes = payload.into_full_changes()?;
        self.apply(id, &changes).await?;
        self.store
            .get_by_id(id)
            .await
            .map_err(internal(WriteStage::Reload))?
            .ok_or(TaskServiceError::NotFound {
                operation: TaskOperation::Update,
                id,
            })
    }

    /// Updates only the fields supplied in `payload`.
    ///
    /// A payload with no recognised field writes nothing but still reports
    /// a missing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for an invalid payload,
    /// [`TaskServiceError::NotFound`] when no task has `id`, or
    /// [`TaskServiceError::Internal`] when any transactional step fails.
    pub async fn patch(&self, id: TaskId, payload: TaskPayload) -> TaskServiceResult<()> {
        let changes = payload.into_partial_changes()?;
        self.apply(id, &changes).await
    }

    /// Deletes a task. Remaining sort orders are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when no task has `id`, or
    /// [`TaskServiceError::Storage`] when the delete fails.
    pub async fn remove(&self, id: TaskId) -> TaskServiceResult<()> {
        if !self.store.remove(id).await? {
            return Err(TaskServiceError::NotFound {
                operation: TaskOperation::Remove,
                id,
            });
        }
        tracing::info!(task_id = %id, "task removed");
        Ok(())
    }

    async fn apply(&self, id: TaskId, changes: &TaskChanges) -> TaskServiceResult<()> {
        let not_found = TaskServiceError::NotFound {
            operation: TaskOperation::Update,
            id,
        };
        if self.store.get_by_id(id).await?.is_none() {
            return Err(not_found);
        }
        if changes.is_empty() {
            tracing::debug!(task_id = %id, "empty update, nothing written");
            return Ok(());
        }

        let mut transaction = self.begin().await?;
        let outcome = update_in_place(transaction.as_mut(), id, changes).await;
        let updated = finish(transaction, outcome).await?;
        if !updated {
            return Err(not_found);
        }
        tracing::info!(task_id = %id, changes = ?changes, "task updated");
        Ok(())
    }

    async fn begin(&self) -> TaskServiceResult<Box<dyn TaskTransaction>> {
        self.store
            .begin_transaction()
            .await
            .map_err(internal(WriteStage::Begin))
    }
}

fn internal(stage: WriteStage) -> impl FnOnce(StorageError) -> TaskServiceError {
    move |source| TaskServiceError::Internal { stage, source }
}

/// Frees `order` by shifting the tasks at and above it, unless only
/// `exclude` sits there.
async fn make_room(
    transaction: &mut dyn TaskTransaction,
    order: SortOrder,
    exclude: Option<TaskId>,
) -> TaskServiceResult<()> {
    let taken = transaction
        .has_sort_order(order, exclude)
        .await
        .map_err(internal(WriteStage::ConflictCheck))?;
    if taken {
        let shifted = transaction
            .shift_sort_orders_from(order)
            .await
            .map_err(internal(WriteStage::Shift))?;
        tracing::debug!(sort_order = %order, shifted, "shifted tasks to free sort order");
    }
    Ok(())
}

async fn insert_in_place(
    transaction: &mut dyn TaskTransaction,
    new_task: &NewTask,
) -> TaskServiceResult<TaskId> {
    make_room(transaction, new_task.sort_order(), None).await?;
    transaction
        .create(new_task)
        .await
        .map_err(internal(WriteStage::Write))
}

/// Returns `false` when the task vanished between lookup and write.
async fn update_in_place(
    transaction: &mut dyn TaskTransaction,
    id: TaskId,
    changes: &TaskChanges,
) -> TaskServiceResult<bool> {
    if let Some(order) = changes.sort_order {
        make_room(transaction, order, Some(id)).await?;
    }
    transaction
        .update(id, changes)
        .await
        .map_err(internal(WriteStage::Write))
}

/// Commits on success and rolls back otherwise. A `false` write result is
/// rolled back too, so a shift never outlives a missing row.
async fn finish<T>(
    transaction: Box<dyn TaskTransaction>,
    outcome: TaskServiceResult<T>,
) -> TaskServiceResult<T>
where
    T: Committable,
{
    match outcome {
        Ok(value) if value.should_commit() => {
            transaction
                .commit()
                .await
                .map_err(internal(WriteStage::Commit))?;
            Ok(value)
        }
        Ok(value) => {
            abort(transaction).await;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, "rolling back task write");
            abort(transaction).await;
            Err(err)
        }
    }
}

async fn abort(transaction: Box<dyn TaskTransaction>) {
    if let Err(err) = transaction.rollback().await {
        tracing::error!(error = %err, "task write rollback failed");
    }
}

trait Committable {
    fn should_commit(&self) -> bool;
}

impl Committable for TaskId {
    fn should_commit(&self) -> bool {
        true
    }
}

impl Committable for bool {
    fn should_commit(&self) -> bool {
        *self
    }
}
