//! `PostgreSQL` adapters for task persistence.

mod models;
mod schema;
mod store;

pub use store::{CREATE_TASK_TABLE_SQL, PostgresTaskStore, TaskPgPool, ensure_schema};
