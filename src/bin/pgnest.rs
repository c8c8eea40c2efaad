//! Daemon binary: parses arguments, initialises logging, runs the proxy.

use clap::Parser;
use pgnest::daemon::{DaemonArgs, PgNestDaemon};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = DaemonArgs::parse();
    let daemon = PgNestDaemon::from_args(args).await?;
    daemon.run().await?;
    Ok(())
}
