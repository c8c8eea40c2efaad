//! Error types for the proxy daemon.

use crate::instance::InstanceError;
use thiserror::Error;

/// Errors raised while running the proxy daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The client-facing port could not be bound.
    #[error("failed to bind daemon port {port}: {source}")]
    Bind {
        /// The port the daemon tried to bind.
        port: u16,
        /// The underlying bind error.
        #[source]
        source: std::io::Error,
    },

    /// The interrupt handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// A client or backend connection failed.
    #[error("proxy connection error: {0}")]
    Proxy(#[source] std::io::Error),

    /// No standby instance was available for a new connection.
    #[error("no standby instance available")]
    Exhausted,

    /// A backend instance failed to start or transition.
    #[error(transparent)]
    Instance(#[from] InstanceError),
}
