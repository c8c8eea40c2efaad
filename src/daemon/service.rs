//! The proxy daemon: accept loop, standby pool, and shutdown handling.

use super::args::DaemonArgs;
use super::error::DaemonError;
use super::mode::DaemonMode;
use super::proxy::proxy_connection;
use crate::instance::{ConnectionProfile, EphemeralPostgres, InstanceConfig};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

/// Listens on the client-facing port and hands each connection a backend
/// server according to the operating mode. One standby instance is kept
/// pre-started so the first connection does not pay startup latency.
#[derive(Debug)]
pub struct PgNestDaemon {
    port: u16,
    mode: DaemonMode,
    config: InstanceConfig,
    standby: Vec<EphemeralPostgres>,
}

impl PgNestDaemon {
    /// Builds a daemon from command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError`] when the connection URL is invalid or the
    /// standby instance fails to start.
    pub async fn from_args(args: DaemonArgs) -> Result<Self, DaemonError> {
        let mut config = InstanceConfig::from_connection_url(&args.connection_url)?;
        if let Some(prefix) = args.data_dir_prefix {
            config = config.with_data_dir_prefix(prefix);
        }
        if let Some(script) = args.load_from {
            config = config.load_database(script);
        }
        for (key, value) in &args.server_params {
            config = config.with_server_setting(key, value);
        }

        let port = config.port_or_allocate()?;
        let mode = if args.single {
            DaemonMode::Single
        } else {
            DaemonMode::PerConnection
        };
        Self::new(port, mode, config).await
    }

    /// Builds a daemon listening on `port`, pre-starting one instance.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::Instance`] when the standby fails to start.
    pub async fn new(
        port: u16,
        mode: DaemonMode,
        config: InstanceConfig,
    ) -> Result<Self, DaemonError> {
        let mut daemon = Self {
            port,
            mode,
            config,
            standby: Vec::new(),
        };
        daemon.allocate_standby().await?;
        Ok(daemon)
    }

    /// Returns the operating mode.
    #[must_use]
    pub const fn mode(&self) -> DaemonMode {
        self.mode
    }

    /// Returns the URL pgnest clients should connect to.
    #[must_use]
    pub fn client_url(&self) -> String {
        ConnectionProfile::new(
            self.config.superuser(),
            self.config.password(),
            self.port,
            self.config.database(),
        )
        .connection_url()
    }

    /// Runs the accept loop until interrupted (ctrl-C).
    ///
    /// Per-connection failures are logged and do not stop the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::Bind`] when the client-facing port cannot be
    /// bound and [`DaemonError::Signal`] when the interrupt handler cannot
    /// be installed.
    pub async fn run(mut self) -> Result<(), DaemonError> {
        let listener =
            TcpListener::bind(("127.0.0.1", self.port))
                .await
                .map_err(|source| DaemonError::Bind {
                    port: self.port,
                    source,
                })?;
        tracing::info!(
            mode = self.mode.as_str(),
            url = %self.client_url(),
            "pgnest daemon listening"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((client, peer)) => {
                            if let Err(err) = self.handle_client(client, peer).await {
                                tracing::warn!(%peer, error = %err, "failed to serve connection");
                            }
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed");
                        }
                    }
                }
                interrupt = tokio::signal::ctrl_c() => {
                    interrupt.map_err(DaemonError::Signal)?;
                    tracing::info!("interrupt received, shutting down");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn handle_client(
        &mut self,
        client: TcpStream,
        peer: SocketAddr,
    ) -> Result<(), DaemonError> {
        client.set_nodelay(true).map_err(DaemonError::Proxy)?;

        let (instance, backend_port) = match self.mode {
            DaemonMode::Single => {
                let shared = self.standby.first().ok_or(DaemonError::Exhausted)?;
                (None, shared.port())
            }
            DaemonMode::PerConnection => {
                if self.standby.is_empty() {
                    self.allocate_standby().await?;
                }
                let mut taken = self.standby.pop().ok_or(DaemonError::Exhausted)?;
                taken.mark_serving()?;
                let backend_port = taken.port();
                (Some(taken), backend_port)
            }
        };

        let backend = TcpStream::connect(("127.0.0.1", backend_port))
            .await
            .map_err(DaemonError::Proxy)?;
        backend.set_nodelay(true).map_err(DaemonError::Proxy)?;
        drop(tokio::spawn(proxy_connection(instance, client, backend, peer)));

        if self.standby.is_empty() && !self.mode.is_single() {
            self.allocate_standby().await?;
        }
        Ok(())
    }

    async fn allocate_standby(&mut self) -> Result<(), DaemonError> {
        let config = self.config.clone().with_unassigned_port();
        self.standby.push(EphemeralPostgres::start_async(config).await?);
        Ok(())
    }
}
