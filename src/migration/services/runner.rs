//! Applies pending revisions to a target database.

use crate::migration::adapters::directory::DirectorySource;
use crate::migration::adapters::postgres as revision_log;
use crate::migration::adapters::postgres::AppliedRevision;
use crate::migration::config::MigrationConfig;
use crate::migration::domain::{MigrationChain, MigrationError, RevisionId};
use camino::Utf8Path;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Outcome of an upgrade run.
#[derive(Debug, Clone)]
pub struct UpgradeReport {
    /// Revisions applied by this run, in order.
    pub newly_applied: Vec<RevisionId>,
    /// Revisions that were already in place before the run.
    pub already_applied: usize,
}

/// Walks a database from its current revision to the chain head.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    chain: MigrationChain,
}

impl MigrationRunner {
    /// Creates a runner over a validated chain.
    #[must_use]
    pub const fn new(chain: MigrationChain) -> Self {
        Self { chain }
    }

    /// Loads and validates the chain from a script directory.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when scripts cannot be read or the chain
    /// invariants are violated.
    pub fn from_directory(path: impl AsRef<Utf8Path>) -> Result<Self, MigrationError> {
        let revisions = DirectorySource::open(path)?.load()?;
        Ok(Self::new(MigrationChain::from_revisions(revisions)?))
    }

    /// Loads the chain named by a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when scripts cannot be read or the chain
    /// invariants are violated.
    pub fn from_config(config: &MigrationConfig) -> Result<Self, MigrationError> {
        Self::from_directory(Utf8Path::new(&config.script_dir))
    }

    /// Returns the validated chain.
    #[must_use]
    pub const fn chain(&self) -> &MigrationChain {
        &self.chain
    }

    /// Applies every revision beyond the database's current one, in chain
    /// order. Each step runs inside its own transaction together with its
    /// log record, so a failed step leaves no partial state behind. Running
    /// against an up-to-date database applies nothing.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when the recorded history diverges from
    /// the chain, a checksum no longer matches its source, or a step fails.
    pub fn upgrade(&self, database_url: &str) -> Result<UpgradeReport, MigrationError> {
        let mut conn = PgConnection::establish(database_url)?;
        revision_log::ensure_log(&mut conn)?;
        let applied = revision_log::applied(&mut conn)?;
        self.verify_applied(&applied)?;

        let pending = self
            .chain
            .ordered()
            .get(applied.len()..)
            .unwrap_or_default();
        let mut newly_applied = Vec::with_capacity(pending.len());
        for revision in pending {
            conn.transaction::<(), diesel::result::Error, _>(|tx| {
                tx.batch_execute(revision.sql())?;
                revision_log::record(tx, revision)
            })
            .map_err(|source| MigrationError::StepFailed {
                id: revision.id().clone(),
                source,
            })?;
            newly_applied.push(revision.id().clone());
        }

        Ok(UpgradeReport {
            newly_applied,
            already_applied: applied.len(),
        })
    }

    /// The applied history must be an exact prefix of the chain, byte-stable
    /// sources included.
    fn verify_applied(&self, applied: &[AppliedRevision]) -> Result<(), MigrationError> {
        let mut expected = self.chain.ordered().iter();
        for row in applied {
            let Some(revision) = expected.next() else {
                return Err(MigrationError::UnknownApplied {
                    revision: row.revision.clone(),
                });
            };
            if revision.id().as_str() != row.revision {
                return Err(MigrationError::HistoryDiverged {
                    expected: revision.id().clone(),
                    found: row.revision.clone(),
                });
            }
            if revision.checksum().to_hex() != row.checksum {
                return Err(MigrationError::ChecksumMismatch {
                    id: revision.id().clone(),
                });
            }
        }
        Ok(())
    }
}
