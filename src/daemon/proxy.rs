//! Bidirectional byte proxy between a client and its backend server.

use crate::instance::EphemeralPostgres;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// Proxies bytes until either side closes.
///
/// In normal mode the served instance is moved in here so that it is torn
/// down exactly when the connection ends; single mode passes `None` and the
/// shared server outlives every connection.
pub(crate) async fn proxy_connection(
    instance: Option<EphemeralPostgres>,
    mut client: TcpStream,
    mut backend: TcpStream,
    peer: SocketAddr,
) {
    match tokio::io::copy_bidirectional(&mut client, &mut backend).await {
        Ok((to_backend, to_client)) => {
            tracing::debug!(%peer, to_backend, to_client, "connection closed");
        }
        Err(err) => {
            tracing::debug!(%peer, error = %err, "proxy ended with error");
        }
    }
    drop(client);
    drop(backend);

    if let Some(served) = instance {
        // Teardown blocks on process exit and directory removal; keep it off
        // the runtime's async workers.
        drop(tokio::task::spawn_blocking(move || drop(served)));
    }
}
