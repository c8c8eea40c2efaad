//! Lifecycle state machine for a provisioned logical database.

use super::error::ProvisionerError;
use std::fmt;

/// Lifecycle stage of a logical database within a running instance.
///
/// Legal transitions are `Absent → Created → Migrated → InUse → Dropped`,
/// where a database may be dropped from any stage after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseLifecycle {
    /// The database does not exist.
    Absent,
    /// `CREATE DATABASE` has run.
    Created,
    /// The migration chain has been applied.
    Migrated,
    /// A test is using the database.
    InUse,
    /// `DROP DATABASE` has run.
    Dropped,
}

impl DatabaseLifecycle {
    /// Returns the canonical textual representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Created => "created",
            Self::Migrated => "migrated",
            Self::InUse => "in_use",
            Self::Dropped => "dropped",
        }
    }

    /// Reports whether moving to `next` is a legal lifecycle transition.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Absent, Self::Created)
                | (Self::Created, Self::Migrated | Self::Dropped)
                | (Self::Migrated, Self::InUse | Self::Dropped)
                | (Self::InUse, Self::Dropped)
        )
    }

    /// Moves to `next`, rejecting transitions the machine forbids.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::InvalidTransition`] when the transition is
    /// not part of the lifecycle.
    pub fn transition(&mut self, next: Self) -> Result<(), ProvisionerError> {
        if !self.can_transition(next) {
            return Err(ProvisionerError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for DatabaseLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
