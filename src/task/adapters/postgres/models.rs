//! Diesel row models for task persistence.

use super::schema::task;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Store-assigned task identifier.
    pub id_task: i64,
    /// Public identifier.
    pub uuid: uuid::Uuid,
    /// Task type.
    pub kind: String,
    /// Task text.
    pub content: String,
    /// List position.
    pub sort_order: i64,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub date_created: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task)]
pub struct NewTaskRow<'a> {
    /// Public identifier.
    pub uuid: uuid::Uuid,
    /// Task type.
    pub kind: &'a str,
    /// Task text.
    pub content: &'a str,
    /// List position.
    pub sort_order: i64,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub date_created: DateTime<Utc>,
}

/// Sparse update model; `None` fields are left out of the `SET` clause.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = task)]
pub struct TaskChangeset<'a> {
    /// Task type.
    pub kind: Option<&'a str>,
    /// Task text.
    pub content: Option<&'a str>,
    /// List position.
    pub sort_order: Option<i64>,
    /// Completion flag.
    pub done: Option<bool>,
}
