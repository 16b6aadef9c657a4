//! In-memory task store for tests and the `in_memory` storage mode.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::task::{
    domain::{NewTask, SortOrder, Task, TaskChanges, TaskId},
    ports::{StorageError, StoreOperation, StoreResult, TaskStore, TaskTransaction},
};

/// Thread-safe in-memory task store.
///
/// A transaction holds the table lock from `begin_transaction` until it is
/// finished, so transactions are serialized and reads wait for them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    table: Arc<Mutex<TaskTable>>,
    failures: HashSet<StoreOperation>,
}

#[derive(Debug, Clone, Default)]
struct TaskTable {
    rows: BTreeMap<TaskId, Task>,
    last_id: i64,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call of `operation` fail with a [`StorageError`].
    ///
    /// Used to exercise rollback paths.
    #[must_use]
    pub fn failing_on(mut self, operation: StoreOperation) -> Self {
        self.failures.insert(operation);
        self
    }

    fn check(failures: &HashSet<StoreOperation>, operation: StoreOperation) -> StoreResult<()> {
        if failures.contains(&operation) {
            return Err(StorageError::message(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        Self::check(&self.failures, StoreOperation::ListAll)?;
        let table = self.table.lock().await;
        let mut tasks: Vec<Task> = table.rows.values().cloned().collect();
        tasks.sort_by_key(|task| (task.sort_order(), task.id()));
        Ok(tasks)
    }

    async fn get_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Self::check(&self.failures, StoreOperation::GetById)?;
        let table = self.table.lock().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn remove(&self, id: TaskId) -> StoreResult<bool> {
        Self::check(&self.failures, StoreOperation::Remove)?;
        let mut table = self.table.lock().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn begin_transaction(&self) -> StoreResult<Box<dyn TaskTransaction>> {
        Self::check(&self.failures, StoreOperation::Begin)?;
        let table = Arc::clone(&self.table).lock_owned().await;
        let snapshot = table.clone();
        Ok(Box::new(InMemoryTransaction {
            table,
            snapshot: Some(snapshot),
            failures: self.failures.clone(),
        }))
    }
}

/// Transaction over the locked in-memory table.
///
/// `snapshot` holds the table as it was at `begin_transaction` and is
/// restored unless the transaction commits.
struct InMemoryTransaction {
    table: OwnedMutexGuard<TaskTable>,
    snapshot: Option<TaskTable>,
    failures: HashSet<StoreOperation>,
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.table = snapshot;
        }
    }
}

#[async_trait]
impl TaskTransaction for InMemoryTransaction {
    async fn has_sort_order(
        &mut self,
        order: SortOrder,
        exclude: Option<TaskId>,
    ) -> StoreResult<bool> {
        InMemoryTaskStore::check(&self.failures, StoreOperation::HasSortOrder)?;
        Ok(self
            .table
            .rows
            .values()
            .any(|task| task.sort_order() == order && Some(task.id()) != exclude))
    }

    async fn shift_sort_orders_from(&mut self, order: SortOrder) -> StoreResult<u64> {
        InMemoryTaskStore::check(&self.failures, StoreOperation::ShiftSortOrders)?;
        let mut affected: Vec<(SortOrder, TaskId)> = self
            .table
            .rows
            .values()
            .filter(|task| task.sort_order() >= order)
            .map(|task| (task.sort_order(), task.id()))
            .collect();
        affected.sort_unstable_by(|left, right| right.cmp(left));

        let mut shifted = 0_u64;
        for (_, id) in affected {
            let Some(row) = self.table.rows.get_mut(&id) else {
                continue;
            };
            *row = row.shifted_up().ok_or_else(|| {
                StorageError::message(
                    StoreOperation::ShiftSortOrders,
                    format!("sort order of task {id} would overflow"),
                )
            })?;
            shifted += 1;
        }
        Ok(shifted)
    }

    async fn create(&mut self, task: &NewTask) -> StoreResult<TaskId> {
        InMemoryTaskStore::check(&self.failures, StoreOperation::Create)?;
        let next = self.table.last_id.checked_add(1).ok_or_else(|| {
            StorageError::message(StoreOperation::Create, "task identifiers exhausted")
        })?;
        let id = TaskId::new(next);
        self.table.last_id = next;
        self.table.rows.insert(id, task.clone().into_task(id));
        Ok(id)
    }

    async fn update(&mut self, id: TaskId, changes: &TaskChanges) -> StoreResult<bool> {
        InMemoryTaskStore::check(&self.failures, StoreOperation::Update)?;
        let Some(row) = self.table.rows.get_mut(&id) else {
            return Ok(false);
        };
        *row = row.with_changes(changes);
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        InMemoryTaskStore::check(&self.failures, StoreOperation::Commit)?;
        let mut transaction = self;
        transaction.snapshot = None;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        InMemoryTaskStore::check(&self.failures, StoreOperation::Rollback)?;
        // Dropping the handle restores the snapshot.
        drop(self);
        Ok(())
    }
}
