//! Shared helpers for integration tests.
//!
//! These tests need the PostgreSQL binaries (`initdb`, `postgres`) on the
//! path, exactly like the library's users do.

use camino::Utf8PathBuf;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use once_cell::sync::Lazy;
use pgnest::instance::{EphemeralPostgres, InstanceConfig};
use pgnest::migration::MigrationRunner;
use std::net::TcpListener;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

static MIGRATIONS_DIR: Lazy<Utf8PathBuf> =
    Lazy::new(|| Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"));

/// Starts a throwaway server with default settings.
pub fn start_instance() -> EphemeralPostgres {
    EphemeralPostgres::start(InstanceConfig::new()).expect("start ephemeral server")
}

/// Returns a runner over the repository's shipped migration chain.
pub fn shipped_migrations() -> MigrationRunner {
    MigrationRunner::from_directory(&*MIGRATIONS_DIR).expect("load shipped migrations")
}

/// Connects to the given database URL.
pub fn establish(url: &str) -> PgConnection {
    PgConnection::establish(url).expect("connect to database")
}

/// Keeps trying to connect until the server behind `url` answers.
pub fn establish_with_retry(url: &str, timeout: Duration) -> PgConnection {
    let deadline = Instant::now() + timeout;
    loop {
        match PgConnection::establish(url) {
            Ok(conn) => return conn,
            Err(err) => {
                assert!(
                    Instant::now() < deadline,
                    "server at {url} never became reachable: {err}"
                );
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

/// Builds the runtime used to drive async stores and the daemon.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("tokio runtime")
}

/// Finds a free TCP port for a daemon to listen on.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe socket");
    listener
        .local_addr()
        .expect("probe socket address")
        .port()
}

/// Row helper for `SELECT current_database()`.
#[derive(QueryableByName)]
pub struct CurrentDatabase {
    /// The reported database name.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub current_database: String,
}

/// Returns the name of the database the connection is attached to.
pub fn current_database(conn: &mut PgConnection) -> String {
    diesel::sql_query("SELECT current_database()")
        .get_result::<CurrentDatabase>(conn)
        .expect("current_database query")
        .current_database
}

/// Row helper for single-setting lookups in `pg_settings`.
#[derive(QueryableByName)]
pub struct SettingRow {
    /// The reported setting value.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub setting: String,
}

/// Returns the live value of a server setting.
pub fn server_setting(conn: &mut PgConnection, name: &str) -> String {
    diesel::sql_query("SELECT setting FROM pg_settings WHERE name = $1")
        .bind::<diesel::sql_types::Text, _>(name)
        .get_result::<SettingRow>(conn)
        .expect("pg_settings query")
        .setting
}
