//! Task data access: the demo client layer exercised by both operating
//! modes.
//!
//! The schema is one `tasks` table (`id`, `task`, `completed`), created by
//! the shipped migration chain. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contract in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::InMemoryTaskStore;
pub use adapters::postgres::{PostgresTaskStore, TaskPgPool};
pub use domain::{NewTask, Task, TaskDomainError, TaskId};
pub use ports::{TaskStore, TaskStoreError, TaskStoreResult};

#[cfg(test)]
mod tests;
