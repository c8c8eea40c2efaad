//! Store port for task persistence.

use crate::tasks::domain::{NewTask, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns all tasks. Order is unspecified; callers impose their own.
    async fn list(&self) -> TaskStoreResult<Vec<Task>>;

    /// Inserts one task with `completed = false`.
    async fn insert(&self, task: NewTask) -> TaskStoreResult<()>;

    /// Marks the task with the given id as completed.
    ///
    /// An id that matches no row is a documented no-op, not an error, and
    /// completing an already-completed task leaves it completed.
    async fn complete(&self, id: TaskId) -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
