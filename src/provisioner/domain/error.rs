//! Error types for logical database provisioning.

use super::name::DatabaseName;
use super::state::DatabaseLifecycle;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by provisioning operations.
#[derive(Debug, Clone, Error)]
pub enum ProvisionerError {
    /// The database name fails PostgreSQL identifier rules.
    #[error("invalid database name `{name}`: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// The allocator prefix fails identifier or length rules.
    #[error("invalid allocator prefix `{prefix}`: {reason}")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,
        /// Why the prefix was rejected.
        reason: &'static str,
    },

    /// The database already exists on the instance.
    #[error("database `{0}` already exists")]
    AlreadyExists(DatabaseName),

    /// A lifecycle transition that the state machine forbids was requested.
    #[error("invalid database transition from {from} to {to}")]
    InvalidTransition {
        /// The stage the database was in.
        from: DatabaseLifecycle,
        /// The requested target stage.
        to: DatabaseLifecycle,
    },

    /// Template setup failed; the partially built template was dropped.
    #[error("template setup failed: {0}")]
    TemplateSetup(Arc<dyn std::error::Error + Send + Sync>),

    /// Admin connection or statement failure.
    #[error("admin session error: {0}")]
    Admin(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProvisionerError {
    /// Wraps an admin-session failure.
    pub fn admin(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Admin(Arc::new(err))
    }
}
