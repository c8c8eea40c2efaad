//! Task entity and insertion payload.

use super::error::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    /// Wraps a raw row id.
    #[must_use]
    pub const fn from_raw(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn into_inner(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    description: String,
    completed: bool,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: TaskId, description: String, completed: bool) -> Self {
        Self {
            id,
            description,
            completed,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Reports whether the task has been completed.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }
}

/// Payload for inserting a task; new tasks always start incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    description: String,
}

impl NewTask {
    /// Creates a validated insertion payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the description is
    /// empty after trimming.
    pub fn new(description: impl Into<String>) -> Result<Self, TaskDomainError> {
        let value = description.into();
        if value.trim().is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        Ok(Self { description: value })
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Consumes the payload, returning the description.
    #[must_use]
    pub fn into_description(self) -> String {
        self.description
    }
}
