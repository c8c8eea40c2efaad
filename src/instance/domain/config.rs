//! Instance configuration and its builder-style setters.

use super::error::InstanceError;
use super::profile::{ConnectionProfile, MAINTENANCE_DATABASE};
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_SUPERUSER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for an ephemeral server, filled in through builder-style setters.
///
/// Every field is optional; [`InstanceConfig::profile`] resolves defaults. The
/// configured settings map is rendered into `postgresql.conf` after `initdb`
/// runs, and the extra `initdb` arguments are appended to its command line.
#[derive(Debug, Clone, Default)]
pub struct InstanceConfig {
    superuser: Option<String>,
    password: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    data_dir_prefix: Option<PathBuf>,
    persist_data_dir: bool,
    dump_path: Option<PathBuf>,
    load_path: Option<PathBuf>,
    bin_dir: Option<PathBuf>,
    server_settings: BTreeMap<String, String>,
    initdb_args: BTreeMap<String, String>,
    ready_timeout: Option<Duration>,
}

impl InstanceConfig {
    /// Creates an empty configuration; all settings resolve to defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses superuser, password, port, and database name out of a
    /// `postgresql://` connection URL.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::InvalidUrl`] when the URL does not parse, uses
    /// a scheme other than `postgresql`, or names a host other than
    /// `localhost`.
    pub fn from_connection_url(connection_url: &str) -> Result<Self, InstanceError> {
        let parsed = Url::parse(connection_url).map_err(|err| InstanceError::InvalidUrl {
            url: connection_url.to_owned(),
            reason: err.to_string(),
        })?;

        if parsed.scheme() != "postgresql" {
            return Err(InstanceError::InvalidUrl {
                url: connection_url.to_owned(),
                reason: format!("expected `postgresql://` scheme, got `{}`", parsed.scheme()),
            });
        }
        if !matches!(parsed.host_str(), Some("localhost" | "127.0.0.1")) {
            return Err(InstanceError::InvalidUrl {
                url: connection_url.to_owned(),
                reason: "ephemeral servers only listen on localhost".to_owned(),
            });
        }

        let mut config = Self::new();
        if !parsed.username().is_empty() {
            config = config.with_superuser(parsed.username());
        }
        if let Some(password) = parsed.password() {
            config = config.with_password(password);
        }
        if let Some(port) = parsed.port() {
            config = config.with_port(port);
        }
        let database = parsed.path().trim_start_matches('/');
        if !database.is_empty() {
            config = config.with_database(database);
        }
        Ok(config)
    }

    /// Sets the cluster superuser created by `initdb`.
    #[must_use]
    pub fn with_superuser(mut self, superuser: &str) -> Self {
        self.superuser = Some(superuser.to_owned());
        self
    }

    /// Sets the superuser password.
    #[must_use]
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_owned());
        self
    }

    /// Sets the TCP port; a random unused port is allocated otherwise.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the name of the database created on startup.
    #[must_use]
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_owned());
        self
    }

    /// Sets the directory in which the temporary data directory is created.
    /// A fresh temporary directory is still created inside it.
    #[must_use]
    pub fn with_data_dir_prefix(mut self, prefix: impl AsRef<Path>) -> Self {
        self.data_dir_prefix = Some(prefix.as_ref().to_path_buf());
        self
    }

    /// Keeps the data directory on disk after shutdown.
    #[must_use]
    pub const fn persist_data(mut self, persist: bool) -> Self {
        self.persist_data_dir = persist;
        self
    }

    /// Dumps the database via `pg_dump` to the given path on shutdown.
    #[must_use]
    pub fn dump_database(mut self, path: impl AsRef<Path>) -> Self {
        self.dump_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Loads the database via `psql` from the given script on startup.
    #[must_use]
    pub fn load_database(mut self, path: impl AsRef<Path>) -> Self {
        self.load_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory holding the PostgreSQL binaries; tools are resolved
    /// from `PATH` otherwise.
    #[must_use]
    pub fn with_bin_dir(mut self, bin_dir: impl AsRef<Path>) -> Self {
        self.bin_dir = Some(bin_dir.as_ref().to_path_buf());
        self
    }

    /// Sets a `postgresql.conf` parameter applied at server startup.
    #[must_use]
    pub fn with_server_setting(mut self, key: &str, value: &str) -> Self {
        self.server_settings.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Adds an extra long-form `initdb` argument, e.g. `encoding`/`UTF8`.
    #[must_use]
    pub fn with_initdb_arg(mut self, key: &str, value: &str) -> Self {
        self.initdb_args.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Bounds how long startup waits for the server to accept connections.
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Returns the superuser, or the `postgres` default.
    #[must_use]
    pub fn superuser(&self) -> String {
        self.superuser
            .clone()
            .unwrap_or_else(|| DEFAULT_SUPERUSER.to_owned())
    }

    /// Returns the password, or the default.
    #[must_use]
    pub fn password(&self) -> String {
        self.password
            .clone()
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_owned())
    }

    /// Returns the initial database name, or the maintenance default.
    #[must_use]
    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| MAINTENANCE_DATABASE.to_owned())
    }

    /// Returns the configured port, allocating and remembering a random
    /// unused one when none is set.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::PortAllocation`] when no local port can be
    /// bound.
    pub fn port_or_allocate(&mut self) -> Result<u16, InstanceError> {
        if let Some(port) = self.port {
            return Ok(port);
        }
        let listener =
            TcpListener::bind(("127.0.0.1", 0)).map_err(InstanceError::PortAllocation)?;
        let port = listener
            .local_addr()
            .map_err(InstanceError::PortAllocation)?
            .port();
        self.port = Some(port);
        Ok(port)
    }

    /// Returns the readiness deadline, or the 10 second default.
    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout.unwrap_or(DEFAULT_READY_TIMEOUT)
    }

    /// Returns the data-dir prefix, if configured.
    #[must_use]
    pub fn data_dir_prefix(&self) -> Option<&Path> {
        self.data_dir_prefix.as_deref()
    }

    /// Reports whether the data directory outlives shutdown.
    #[must_use]
    pub const fn persists_data(&self) -> bool {
        self.persist_data_dir
    }

    /// Returns the dump path, if configured.
    #[must_use]
    pub fn dump_path(&self) -> Option<&Path> {
        self.dump_path.as_deref()
    }

    /// Returns the startup load script, if configured.
    #[must_use]
    pub fn load_path(&self) -> Option<&Path> {
        self.load_path.as_deref()
    }

    /// Returns the PostgreSQL binary directory, if configured.
    #[must_use]
    pub fn bin_dir(&self) -> Option<&Path> {
        self.bin_dir.as_deref()
    }

    /// Returns the configured `postgresql.conf` parameters.
    #[must_use]
    pub const fn server_settings(&self) -> &BTreeMap<String, String> {
        &self.server_settings
    }

    /// Returns the configured extra `initdb` arguments.
    #[must_use]
    pub const fn initdb_args(&self) -> &BTreeMap<String, String> {
        &self.initdb_args
    }

    /// Clears the configured port so a clone starts on a fresh random one.
    #[must_use]
    pub const fn with_unassigned_port(mut self) -> Self {
        self.port = None;
        self
    }

    /// Resolves a connection profile, allocating a port when needed.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::PortAllocation`] when no local port can be
    /// bound.
    pub fn profile(&mut self) -> Result<ConnectionProfile, InstanceError> {
        let port = self.port_or_allocate()?;
        Ok(ConnectionProfile::new(
            self.superuser(),
            self.password(),
            port,
            self.database(),
        ))
    }
}
