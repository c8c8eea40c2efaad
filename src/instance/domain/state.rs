//! Lifecycle state machine for an ephemeral server instance.

use super::error::InstanceError;
use std::fmt;

/// Lifecycle state of an ephemeral server.
///
/// Legal transitions form the cycle `Stopped → Starting → Ready → Serving →
/// Stopping → Stopped`; a `Ready` instance may stop without ever serving, and
/// a `Serving` instance returns to `Ready` when its client disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    /// No server process exists.
    Stopped,
    /// The data directory is being initialised and the server is starting.
    Starting,
    /// The server accepts connections.
    Ready,
    /// A client connection is being served.
    Serving,
    /// Shutdown has begun.
    Stopping,
}

impl InstanceState {
    /// Returns the canonical textual representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Serving => "serving",
            Self::Stopping => "stopping",
        }
    }

    /// Reports whether moving to `next` is a legal lifecycle transition.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Stopped, Self::Starting)
                | (Self::Starting, Self::Ready | Self::Stopping)
                | (Self::Ready, Self::Serving | Self::Stopping)
                | (Self::Serving, Self::Ready | Self::Stopping)
                | (Self::Stopping, Self::Stopped)
        )
    }

    /// Moves to `next`, rejecting transitions the machine forbids.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::InvalidTransition`] when the transition is not
    /// part of the lifecycle.
    pub fn transition(&mut self, next: Self) -> Result<(), InstanceError> {
        if !self.can_transition(next) {
            return Err(InstanceError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
