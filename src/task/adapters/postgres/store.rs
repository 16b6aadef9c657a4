//! `PostgreSQL` store implementation for the ordered task list.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::task,
};
use crate::task::{
    domain::{
        NewTask, PersistedTask, SortOrder, Task, TaskChanges, TaskContent, TaskId, TaskKind,
        TaskUuid,
    },
    ports::{StorageError, StoreOperation, StoreResult, TaskStore, TaskTransaction},
};
use async_trait::async_trait;
use diesel::connection::{AnsiTransactionManager, SimpleConnection, TransactionManager};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::Error as DieselError;
use std::sync::{Arc, Mutex};

/// `PostgreSQL` connection pool type used by the task store.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// SQL creating the task table and its sort-order index.
pub const CREATE_TASK_TABLE_SQL: &str =
    include_str!("../../../../migrations/2026-10-16-000000_create_task_table/up.sql");

// Lock the rows being moved from the top down, then move them in one
// statement. `UPDATE` has no `ORDER BY` in `PostgreSQL`.
const SHIFT_SORT_ORDERS_SQL: &str = concat!(
    "UPDATE task SET sort_order = sort_order + 1 ",
    "WHERE id_task IN (",
    "SELECT id_task FROM task WHERE sort_order >= $1 ",
    "ORDER BY sort_order DESC FOR UPDATE",
    ")",
);

/// Applies the bundled task schema. Safe to run repeatedly.
///
/// # Errors
///
/// Returns [`StorageError`] when a connection cannot be obtained or the
/// schema statements fail.
pub async fn ensure_schema(pool: &TaskPgPool) -> StoreResult<()> {
    let store = PostgresTaskStore::new(pool.clone());
    store
        .run_blocking(StoreOperation::EnsureSchema, |connection| {
            connection
                .batch_execute(CREATE_TASK_TABLE_SQL)
                .map_err(database_error(StoreOperation::EnsureSchema))
        })
        .await
}

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: StoreOperation, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = checkout(&pool)?;
            f(&mut connection)
        })
        .await
        .map_err(|err| StorageError::new(operation, err))?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        let operation = StoreOperation::ListAll;
        self.run_blocking(operation, move |connection| {
            let rows = task::table
                .order((task::sort_order.asc(), task::id_task.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(database_error(operation))?;
            rows.into_iter()
                .map(|row| row_to_task(operation, row))
                .collect()
        })
        .await
    }

    async fn get_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let operation = StoreOperation::GetById;
        self.run_blocking(operation, move |connection| {
            let row = task::table
                .filter(task::id_task.eq(id.value()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(database_error(operation))?;
            row.map(|found| row_to_task(operation, found)).transpose()
        })
        .await
    }

    async fn remove(&self, id: TaskId) -> StoreResult<bool> {
        let operation = StoreOperation::Remove;
        self.run_blocking(operation, move |connection| {
            let deleted = diesel::delete(task::table.filter(task::id_task.eq(id.value())))
                .execute(connection)
                .map_err(database_error(operation))?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn begin_transaction(&self) -> StoreResult<Box<dyn TaskTransaction>> {
        let pool = self.pool.clone();
        let connection = tokio::task::spawn_blocking(move || {
            let mut connection = checkout(&pool)?;
            AnsiTransactionManager::begin_transaction(&mut *connection)
                .map_err(database_error(StoreOperation::Begin))?;
            Ok::<_, StorageError>(connection)
        })
        .await
        .map_err(|err| StorageError::new(StoreOperation::Begin, err))??;

        Ok(Box::new(PostgresTaskTransaction {
            connection: Arc::new(Mutex::new(connection)),
        }))
    }
}

/// Transaction pinned to one pooled connection.
///
/// A handle dropped before `commit` or `rollback` leaves its connection
/// inside an open transaction; the pool treats such connections as broken
/// and closes them, which rolls the transaction back server-side.
struct PostgresTaskTransaction {
    connection: Arc<Mutex<PooledConn>>,
}

impl PostgresTaskTransaction {
    async fn run<F, T>(&self, operation: StoreOperation, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = shared
                .lock()
                .map_err(|err| StorageError::message(operation, err.to_string()))?;
            let connection: &mut PgConnection = &mut guard;
            f(connection).map_err(database_error(operation))
        })
        .await
        .map_err(|err| StorageError::new(operation, err))?
    }
}

#[async_trait]
impl TaskTransaction for PostgresTaskTransaction {
    async fn has_sort_order(
        &mut self,
        order: SortOrder,
        exclude: Option<TaskId>,
    ) -> StoreResult<bool> {
        self.run(StoreOperation::HasSortOrder, move |connection| {
            let mut query = task::table
                .filter(task::sort_order.eq(order.value()))
                .into_boxed();
            if let Some(excluded) = exclude {
                query = query.filter(task::id_task.ne(excluded.value()));
            }
            let count = query.count().get_result::<i64>(connection)?;
            Ok(count > 0)
        })
        .await
    }

    async fn shift_sort_orders_from(&mut self, order: SortOrder) -> StoreResult<u64> {
        let shifted = self
            .run(StoreOperation::ShiftSortOrders, move |connection| {
                diesel::sql_query(SHIFT_SORT_ORDERS_SQL)
                    .bind::<diesel::sql_types::BigInt, _>(order.value())
                    .execute(connection)
            })
            .await?;
        u64::try_from(shifted)
            .map_err(|err| StorageError::new(StoreOperation::ShiftSortOrders, err))
    }

    async fn create(&mut self, new_task: &NewTask) -> StoreResult<TaskId> {
        let uuid = new_task.uuid().into_inner();
        let kind = new_task.kind().as_str();
        let content = new_task.content().as_str().to_owned();
        let sort_order = new_task.sort_order().value();
        let done = new_task.is_done();
        let date_created = new_task.created_at();

        let id = self
            .run(StoreOperation::Create, move |connection| {
                let row = NewTaskRow {
                    uuid,
                    kind,
                    content: &content,
                    sort_order,
                    done,
                    date_created,
                };
                diesel::insert_into(task::table)
                    .values(&row)
                    .returning(task::id_task)
                    .get_result::<i64>(connection)
            })
            .await?;
        Ok(TaskId::new(id))
    }

    async fn update(&mut self, id: TaskId, changes: &TaskChanges) -> StoreResult<bool> {
        let target = id.value();
        let kind = changes.kind.map(TaskKind::as_str);
        let content = changes.content.as_ref().map(|text| text.as_str().to_owned());
        let sort_order = changes.sort_order.map(SortOrder::value);
        let done = changes.done;
        let is_empty = changes.is_empty();

        self.run(StoreOperation::Update, move |connection| {
            // Diesel rejects an empty changeset; an empty update only
            // reports whether the row exists.
            if is_empty {
                let count = task::table
                    .filter(task::id_task.eq(target))
                    .count()
                    .get_result::<i64>(connection)?;
                return Ok(count > 0);
            }

            let changeset = TaskChangeset {
                kind,
                content: content.as_deref(),
                sort_order,
                done,
            };
            let updated = diesel::update(task::table.filter(task::id_task.eq(target)))
                .set(&changeset)
                .execute(connection)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.run(StoreOperation::Commit, |connection| {
            AnsiTransactionManager::commit_transaction(connection)
        })
        .await
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.run(StoreOperation::Rollback, |connection| {
            AnsiTransactionManager::rollback_transaction(connection)
        })
        .await
    }
}

fn checkout(pool: &TaskPgPool) -> StoreResult<PooledConn> {
    pool.get().map_err(|err| {
        tracing::warn!(error = %err, "failed to obtain a database connection");
        StorageError::new(StoreOperation::Connect, err)
    })
}

/// Builds a mapper that wraps and logs a Diesel error raised by `operation`.
fn database_error(operation: StoreOperation) -> impl FnOnce(DieselError) -> StorageError {
    move |err| {
        let code = match &err {
            DieselError::DatabaseError(kind, _) => Some(format!("{kind:?}")),
            _ => None,
        };
        let mut error = StorageError::new(operation, err);
        if let Some(value) = code {
            error = error.with_code(value);
        }
        tracing::warn!(
            operation = %operation,
            code = error.code().unwrap_or("none"),
            error = %error,
            "database error"
        );
        error
    }
}

fn row_to_task(operation: StoreOperation, row: TaskRow) -> StoreResult<Task> {
    let TaskRow {
        id_task,
        uuid,
        kind: persisted_kind,
        content: persisted_content,
        sort_order,
        done,
        date_created,
    } = row;

    let kind = TaskKind::try_from(persisted_kind.as_str())
        .map_err(|err| StorageError::new(operation, err))?;
    let content =
        TaskContent::new(persisted_content).map_err(|err| StorageError::new(operation, err))?;

    Ok(Task::from_persisted(PersistedTask {
        id: TaskId::new(id_task),
        uuid: TaskUuid::from_uuid(uuid),
        kind,
        content,
        sort_order: SortOrder::new(sort_order),
        done,
        created_at: date_created,
    }))
}
