//! Diesel row models for task persistence.

use super::schema::tasks;
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Server-assigned row id.
    pub id: i32,
    /// Task description.
    pub task: String,
    /// Completion flag.
    pub completed: bool,
}

/// Insert model for task records; `completed` comes from the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task description.
    pub task: String,
}
