//! Revision bookkeeping table on the target database.

use crate::migration::domain::{MigrationError, Revision};
use diesel::pg::PgConnection;
use diesel::prelude::*;

const CREATE_LOG_SQL: &str = concat!(
    "CREATE TABLE IF NOT EXISTS schema_revisions (",
    "ordinal SERIAL PRIMARY KEY, ",
    "revision TEXT NOT NULL UNIQUE, ",
    "checksum TEXT NOT NULL, ",
    "applied_at TIMESTAMPTZ NOT NULL DEFAULT now())",
);

/// One recorded revision application.
#[derive(Debug, QueryableByName)]
pub struct AppliedRevision {
    /// Recorded revision id.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub revision: String,
    /// Recorded source checksum, hex-encoded.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub checksum: String,
}

/// Creates the revision log table when it does not exist yet.
///
/// # Errors
///
/// Returns [`MigrationError::Log`] on statement failure.
pub fn ensure_log(conn: &mut PgConnection) -> Result<(), MigrationError> {
    diesel::sql_query(CREATE_LOG_SQL)
        .execute(conn)
        .map_err(MigrationError::Log)?;
    Ok(())
}

/// Returns the applied revisions in application order.
///
/// # Errors
///
/// Returns [`MigrationError::Log`] on query failure.
pub fn applied(conn: &mut PgConnection) -> Result<Vec<AppliedRevision>, MigrationError> {
    diesel::sql_query("SELECT revision, checksum FROM schema_revisions ORDER BY ordinal ASC")
        .load::<AppliedRevision>(conn)
        .map_err(MigrationError::Log)
}

/// Records an applied revision; call inside the step's transaction so the
/// record commits together with the schema change.
///
/// # Errors
///
/// Returns the raw statement error for the surrounding transaction to map.
pub fn record(conn: &mut PgConnection, revision: &Revision) -> Result<(), diesel::result::Error> {
    diesel::sql_query("INSERT INTO schema_revisions (revision, checksum) VALUES ($1, $2)")
        .bind::<diesel::sql_types::Text, _>(revision.id().as_str())
        .bind::<diesel::sql_types::Text, _>(revision.checksum().to_hex())
        .execute(conn)?;
    Ok(())
}
