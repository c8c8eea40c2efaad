//! Operating mode selection.

use std::fmt;
use thiserror::Error;

/// How the daemon maps client connections to servers.
///
/// The two modes trade isolation granularity against setup cost: fresh
/// servers isolate completely but pay startup per connection; a shared
/// server is cheap but leaves isolation to per-test logical databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaemonMode {
    /// Normal mode: every client connection gets its own freshly started
    /// server, torn down when the connection closes.
    PerConnection,
    /// Single mode: all connections share one long-lived server; tests
    /// isolate through provisioned logical databases.
    Single,
}

impl DaemonMode {
    /// Returns the canonical textual representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerConnection => "normal",
            Self::Single => "single",
        }
    }

    /// Reports whether connections share one server.
    #[must_use]
    pub const fn is_single(self) -> bool {
        matches!(self, Self::Single)
    }
}

impl fmt::Display for DaemonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DaemonMode {
    type Error = ParseDaemonModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::PerConnection),
            "single" => Ok(Self::Single),
            _ => Err(ParseDaemonModeError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a daemon mode name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown daemon mode: {0}")]
pub struct ParseDaemonModeError(pub String);
