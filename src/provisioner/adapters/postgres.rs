//! Admin sessions executing database DDL against a running instance.

use crate::provisioner::domain::{DatabaseName, ProvisionerError};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use url::Url;

/// Admin connection factory bound to an instance's maintenance database URL.
///
/// `CREATE DATABASE` and `DROP DATABASE` cannot run inside a transaction
/// block, so every statement executes on a fresh autocommit connection.
#[derive(Debug, Clone)]
pub struct AdminSession {
    url: String,
}

impl AdminSession {
    /// Creates an admin session for the given maintenance database URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Reports whether the server currently accepts admin connections.
    #[must_use]
    pub fn ping(&self) -> bool {
        PgConnection::establish(&self.url).is_ok()
    }

    /// Returns a connection URL for another database on the same server.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Admin`] when the session URL cannot be
    /// re-parsed.
    pub fn database_url(&self, name: &DatabaseName) -> Result<String, ProvisionerError> {
        let mut parsed = Url::parse(&self.url).map_err(ProvisionerError::admin)?;
        parsed.set_path(name.as_str());
        Ok(parsed.into())
    }

    /// Creates a logical database.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::AlreadyExists`] when the name is taken and
    /// [`ProvisionerError::Admin`] on connection or statement failure.
    pub fn create_database(&self, name: &DatabaseName) -> Result<(), ProvisionerError> {
        if self.database_exists(name)? {
            return Err(ProvisionerError::AlreadyExists(name.clone()));
        }
        let sql = format!("CREATE DATABASE {}", quote_identifier(name.as_str()));
        self.execute_create(name, &sql)
    }

    /// Creates a logical database cloned from an existing template database.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::AlreadyExists`] when the name is taken and
    /// [`ProvisionerError::Admin`] on connection or statement failure.
    pub fn create_database_from_template(
        &self,
        name: &DatabaseName,
        template: &DatabaseName,
    ) -> Result<(), ProvisionerError> {
        if self.database_exists(name)? {
            return Err(ProvisionerError::AlreadyExists(name.clone()));
        }
        let sql = format!(
            "CREATE DATABASE {} TEMPLATE {}",
            quote_identifier(name.as_str()),
            quote_identifier(template.as_str()),
        );
        self.execute_create(name, &sql)
    }

    /// Drops a logical database. Uses `IF EXISTS`, so dropping an absent
    /// database succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Admin`] on connection or statement
    /// failure.
    pub fn drop_database(&self, name: &DatabaseName) -> Result<(), ProvisionerError> {
        let sql = format!("DROP DATABASE IF EXISTS {}", quote_identifier(name.as_str()));
        let mut conn = self.connect()?;
        diesel::sql_query(sql)
            .execute(&mut conn)
            .map_err(ProvisionerError::admin)?;
        Ok(())
    }

    /// Reports whether a database with the given name exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Admin`] on connection or query failure.
    pub fn database_exists(&self, name: &DatabaseName) -> Result<bool, ProvisionerError> {
        #[derive(QueryableByName)]
        struct ExistsRow {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            exists: bool,
        }

        let mut conn = self.connect()?;
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1) AS exists",
        )
        .bind::<diesel::sql_types::Text, _>(name.as_str())
        .get_result::<ExistsRow>(&mut conn)
        .map_err(ProvisionerError::admin)?;
        Ok(row.exists)
    }

    fn connect(&self) -> Result<PgConnection, ProvisionerError> {
        PgConnection::establish(&self.url).map_err(ProvisionerError::admin)
    }

    /// The window between the existence pre-check and `CREATE DATABASE` is
    /// closed by the engine; its duplicate failure maps to the same conflict.
    fn execute_create(&self, name: &DatabaseName, sql: &str) -> Result<(), ProvisionerError> {
        let mut conn = self.connect()?;
        diesel::sql_query(sql).execute(&mut conn).map_err(|err| {
            if is_duplicate_database(&err) {
                ProvisionerError::AlreadyExists(name.clone())
            } else {
                ProvisionerError::admin(err)
            }
        })?;
        Ok(())
    }
}

fn is_duplicate_database(err: &DieselError) -> bool {
    matches!(err, DieselError::DatabaseError(_, info) if info.message().contains("already exists"))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
