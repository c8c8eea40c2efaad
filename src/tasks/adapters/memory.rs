//! In-memory task store for unit tests.

use crate::tasks::domain::{NewTask, Task, TaskId};
use crate::tasks::ports::{TaskStore, TaskStoreError, TaskStoreResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory task store assigning sequential ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    rows: BTreeMap<i32, TaskEntry>,
}

#[derive(Debug)]
struct TaskEntry {
    description: String,
    completed: bool,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> TaskStoreResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn read(&self) -> TaskStoreResult<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self) -> TaskStoreResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .rows
            .iter()
            .map(|(id, entry)| {
                Task::from_persisted(
                    TaskId::from_raw(*id),
                    entry.description.clone(),
                    entry.completed,
                )
            })
            .collect())
    }

    async fn insert(&self, task: NewTask) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        let id = state.next_id.wrapping_add(1);
        state.next_id = id;
        state.rows.insert(
            id,
            TaskEntry {
                description: task.into_description(),
                completed: false,
            },
        );
        Ok(())
    }

    async fn complete(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        // Unknown ids fall through; the no-op mirrors the SQL store.
        if let Some(entry) = state.rows.get_mut(&id.into_inner()) {
            entry.completed = true;
        }
        Ok(())
    }
}
