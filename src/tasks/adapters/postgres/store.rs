//! PostgreSQL task store backed by a connection pool.

use super::models::{NewTaskRow, TaskRow};
use super::schema::tasks;
use crate::tasks::domain::{NewTask, Task, TaskId};
use crate::tasks::ports::{TaskStore, TaskStoreError, TaskStoreResult};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// PostgreSQL connection pool type used by the task store.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// PostgreSQL-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Builds a small pool against the given database URL.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the pool cannot be
    /// built.
    pub fn connect(database_url: &str, max_size: u32) -> TaskStoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(TaskStoreError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn list(&self) -> TaskStoreResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let rows = tasks::table
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(rows.into_iter().map(row_to_task).collect())
        })
        .await
    }

    async fn insert(&self, task: NewTask) -> TaskStoreResult<()> {
        let new_row = NewTaskRow {
            task: task.into_description(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn complete(&self, id: TaskId) -> TaskStoreResult<()> {
        self.run_blocking(move |connection| {
            // Zero affected rows is the documented no-op for unknown ids.
            diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set(tasks::completed.eq(true))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn row_to_task(row: TaskRow) -> Task {
    Task::from_persisted(TaskId::from_raw(row.id), row.task, row.completed)
}
