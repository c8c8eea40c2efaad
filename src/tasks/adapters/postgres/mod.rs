//! PostgreSQL adapter for the task store.

pub mod models;
pub mod schema;
mod store;

pub use store::{PostgresTaskStore, TaskPgPool};
