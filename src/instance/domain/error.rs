//! Error types for ephemeral instance provisioning.

use super::state::InstanceState;
use crate::provisioner::ProvisionerError;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while provisioning or tearing down an ephemeral server.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// The connection URL could not be parsed into instance settings.
    #[error("invalid connection URL `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// The temporary data directory could not be created or removed.
    #[error("temporary data directory error: {0}")]
    TempDir(#[source] std::io::Error),

    /// No free TCP port could be allocated for the server.
    #[error("failed to allocate a free port: {0}")]
    PortAllocation(#[source] std::io::Error),

    /// An external PostgreSQL tool could not be spawned.
    #[error("failed to run `{tool}` (is it installed and on your path?): {source}")]
    ToolSpawn {
        /// The tool that failed to start.
        tool: &'static str,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// An external PostgreSQL tool exited unsuccessfully.
    #[error("`{tool}` failed with {status}: {detail}")]
    ToolFailed {
        /// The tool that failed.
        tool: &'static str,
        /// The exit status reported by the tool.
        status: ExitStatus,
        /// Captured stdout and stderr.
        detail: String,
    },

    /// Delivering a shutdown signal to the server process failed.
    #[error("failed to signal server process: {0}")]
    Signal(String),

    /// The server did not accept connections within the configured deadline.
    #[error("server did not become ready within {timeout:?}")]
    ReadyTimeout {
        /// The configured readiness deadline.
        timeout: Duration,
    },

    /// Rendering the server configuration overlay failed.
    #[error("failed to render server configuration: {0}")]
    ConfigRender(#[from] minijinja::Error),

    /// The `postgres` system user could not be resolved while running as root.
    #[error("postgres superuser lookup failed: {0}")]
    SuperuserLookup(String),

    /// Creating the initial database on the fresh server failed.
    #[error("initial database creation failed: {0}")]
    InitialDatabase(#[source] ProvisionerError),

    /// A lifecycle transition that the state machine forbids was requested.
    #[error("invalid instance transition from {from} to {to}")]
    InvalidTransition {
        /// The state the instance was in.
        from: InstanceState,
        /// The requested target state.
        to: InstanceState,
    },

    /// A background start task could not be joined.
    #[error("background start task failed: {0}")]
    Background(String),
}
