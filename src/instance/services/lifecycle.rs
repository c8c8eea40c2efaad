//! Lifecycle handle owning an ephemeral server process.

use crate::instance::adapters::process::{self, DataDir};
use crate::instance::domain::{
    ConnectionProfile, InstanceConfig, InstanceError, InstanceState, MAINTENANCE_DATABASE,
};
use crate::provisioner::{AdminSession, DatabaseName};
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::task::spawn_blocking;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a local PostgreSQL server running out of a temporary directory.
///
/// [`EphemeralPostgres::shutdown`] (or dropping the handle) stops the server
/// and removes the directory, so teardown happens on every exit path,
/// including panics in the owning thread.
#[derive(Debug)]
pub struct EphemeralPostgres {
    profile: ConnectionProfile,
    data_dir: PathBuf,
    persist: bool,
    dump_path: Option<PathBuf>,
    bin_dir: Option<PathBuf>,
    state: InstanceState,
    temp_dir: Option<TempDir>,
    server: Option<Child>,
}

impl EphemeralPostgres {
    /// Initialises a data directory, starts a server, waits for it to accept
    /// connections, and creates the configured initial database.
    ///
    /// This blocks for the duration of `initdb` and server startup; use
    /// [`EphemeralPostgres::start_async`] from async contexts.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError`] when a tool fails, the server misses its
    /// readiness deadline, or the initial database cannot be created. The
    /// partially started server is torn down before returning.
    pub fn start(mut config: InstanceConfig) -> Result<Self, InstanceError> {
        let profile = config.profile()?;
        let mut state = InstanceState::Stopped;
        state.transition(InstanceState::Starting)?;

        let DataDir { temp, data_dir } = process::init_data_dir(&config)?;
        process::append_server_conf(&data_dir, temp.path(), profile.port(), &config)?;
        let server = process::spawn_server(config.bin_dir(), &data_dir)?;

        let mut instance = Self {
            profile,
            data_dir,
            persist: config.persists_data(),
            dump_path: config.dump_path().map(Path::to_path_buf),
            bin_dir: config.bin_dir().map(Path::to_path_buf),
            state,
            temp_dir: Some(temp),
            server: Some(server),
        };

        instance.wait_until_ready(config.ready_timeout())?;
        instance.create_initial_database()?;
        if let Some(script) = config.load_path() {
            process::load_database(
                instance.bin_dir.as_deref(),
                &instance.connection_url(),
                script,
            )?;
        }
        instance.state.transition(InstanceState::Ready)?;
        Ok(instance)
    }

    /// Starts a server on a blocking worker thread.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`EphemeralPostgres::start`], plus
    /// [`InstanceError::Background`] when the worker cannot be joined.
    pub async fn start_async(config: InstanceConfig) -> Result<Self, InstanceError> {
        spawn_blocking(move || Self::start(config))
            .await
            .map_err(|err| InstanceError::Background(err.to_string()))?
    }

    /// Returns the connection profile for this server.
    #[must_use]
    pub const fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> InstanceState {
        self.state
    }

    /// Returns the superuser name.
    #[must_use]
    pub fn user(&self) -> &str {
        self.profile.user()
    }

    /// Returns the superuser password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.profile.password()
    }

    /// Returns the port the server listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.profile.port()
    }

    /// Returns the name of the initial database.
    #[must_use]
    pub fn database(&self) -> &str {
        self.profile.database()
    }

    /// Returns the path of the server data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns a `postgresql://` URL for the initial database.
    #[must_use]
    pub fn connection_url(&self) -> String {
        self.profile.connection_url()
    }

    /// Returns a libpq-style keyword/value connection string.
    #[must_use]
    pub fn connection_string(&self) -> String {
        self.profile.connection_string()
    }

    /// Returns a `postgresql://` URL for an arbitrary database on this
    /// server.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.profile.database_url(database)
    }

    /// Returns a `postgresql://` URL for the maintenance database.
    #[must_use]
    pub fn admin_url(&self) -> String {
        self.profile.admin_url()
    }

    /// Records that a client connection is being served.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::InvalidTransition`] when the instance is not
    /// ready.
    pub fn mark_serving(&mut self) -> Result<(), InstanceError> {
        self.state.transition(InstanceState::Serving)
    }

    /// Records that the served client has disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::InvalidTransition`] when the instance is not
    /// serving.
    pub fn mark_idle(&mut self) -> Result<(), InstanceError> {
        self.state.transition(InstanceState::Ready)
    }

    /// Stops the server and releases the data directory. Equivalent to
    /// dropping the handle, but surfaces errors. Safe to call twice.
    ///
    /// When a dump path is configured the database is dumped first, while the
    /// server is still running. When persisting, shutdown is graceful
    /// (SIGTERM) and will wait for connected clients to disconnect; otherwise
    /// the server is killed outright.
    ///
    /// # Errors
    ///
    /// Returns the first failure among dump, server stop, and directory
    /// removal; later steps still run so the process and directory are not
    /// leaked behind an early error.
    pub fn shutdown(&mut self) -> Result<(), InstanceError> {
        if self.server.is_none() && self.temp_dir.is_none() {
            return Ok(());
        }
        if self.state != InstanceState::Stopping {
            self.state.transition(InstanceState::Stopping)?;
        }

        let dump_result = self.dump_path.clone().map_or(Ok(()), |path| {
            process::dump_database(self.bin_dir.as_deref(), &self.connection_url(), &path)
        });

        let stop_result = self.server.take().map_or(Ok(()), |server| {
            process::stop_server(server, self.persist)
        });
        let dir_result = self.release_data_dir();
        let transition_result = self.state.transition(InstanceState::Stopped);

        dump_result
            .and(stop_result)
            .and(dir_result)
            .and(transition_result)
    }

    fn wait_until_ready(&self, timeout: Duration) -> Result<(), InstanceError> {
        let admin = AdminSession::new(self.admin_url());
        let deadline = Instant::now() + timeout;
        while !admin.ping() {
            if Instant::now() >= deadline {
                return Err(InstanceError::ReadyTimeout { timeout });
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
        Ok(())
    }

    fn create_initial_database(&self) -> Result<(), InstanceError> {
        if self.profile.database() == MAINTENANCE_DATABASE {
            return Ok(());
        }
        let name = DatabaseName::new(self.profile.database())
            .map_err(InstanceError::InitialDatabase)?;
        AdminSession::new(self.admin_url())
            .create_database(&name)
            .map_err(InstanceError::InitialDatabase)
    }

    fn release_data_dir(&mut self) -> Result<(), InstanceError> {
        let Some(temp) = self.temp_dir.take() else {
            return Ok(());
        };
        if self.persist {
            let _path = temp.keep();
            Ok(())
        } else {
            temp.close().map_err(InstanceError::TempDir)
        }
    }
}

impl Drop for EphemeralPostgres {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(error = %err, "ephemeral server teardown failed");
            if let Some(server) = self.server.take() {
                drop(process::stop_server(server, false));
            }
            drop(self.release_data_dir());
        }
    }
}
