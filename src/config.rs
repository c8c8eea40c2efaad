//! Explicit endpoint configuration for test setups.
//!
//! Tests receive the daemon's client URLs as explicit configuration rather
//! than ambient lookups: construct [`TestEndpoints`] directly, or opt in to
//! the environment with [`TestEndpoints::from_env`]. Nothing in the library
//! reads the environment implicitly.

use thiserror::Error;
use url::Url;

/// Environment variable naming the normal-mode connection URL.
pub const ENV_NORMAL: &str = "PGNEST_NORMAL";

/// Environment variable naming the single-mode connection URL. The URL
/// carries no database name; single-mode tests provision their own
/// databases.
pub const ENV_SINGLE: &str = "PGNEST_SINGLE";

/// Connection endpoints for the two operating modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestEndpoints {
    normal: Option<Url>,
    single: Option<Url>,
}

/// Errors raised while reading endpoint configuration.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// An endpoint variable is set but does not parse as a URL.
    #[error("{var} does not contain a valid URL: {source}")]
    Invalid {
        /// The offending variable name.
        var: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// An endpoint variable is set but not valid Unicode.
    #[error("{var} is not valid Unicode")]
    NotUnicode {
        /// The offending variable name.
        var: &'static str,
    },
}

impl TestEndpoints {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normal-mode endpoint.
    #[must_use]
    pub fn with_normal(mut self, url: Url) -> Self {
        self.normal = Some(url);
        self
    }

    /// Sets the single-mode endpoint.
    #[must_use]
    pub fn with_single(mut self, url: Url) -> Self {
        self.single = Some(url);
        self
    }

    /// Reads both endpoints from [`ENV_NORMAL`] and [`ENV_SINGLE`]; unset
    /// variables leave the corresponding endpoint empty.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when a variable is set but malformed.
    pub fn from_env() -> Result<Self, EndpointError> {
        Ok(Self {
            normal: read_var(ENV_NORMAL)?,
            single: read_var(ENV_SINGLE)?,
        })
    }

    /// Returns the normal-mode endpoint, if configured.
    #[must_use]
    pub const fn normal(&self) -> Option<&Url> {
        self.normal.as_ref()
    }

    /// Returns the single-mode endpoint, if configured.
    #[must_use]
    pub const fn single(&self) -> Option<&Url> {
        self.single.as_ref()
    }
}

fn read_var(var: &'static str) -> Result<Option<Url>, EndpointError> {
    match std::env::var(var) {
        Ok(raw) => Url::parse(&raw)
            .map(Some)
            .map_err(|source| EndpointError::Invalid { var, source }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(EndpointError::NotUnicode { var }),
    }
}
