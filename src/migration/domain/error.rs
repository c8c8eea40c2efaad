//! Error types for migration chains and their application.

use super::revision::RevisionId;
use thiserror::Error;

/// Errors raised while building or applying a migration chain.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A revision id fails the identifier rules.
    #[error("invalid revision id `{value}`: {reason}")]
    InvalidRevisionId {
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// Two revisions share the same id.
    #[error("duplicate revision id `{0}`")]
    DuplicateRevision(RevisionId),

    /// No revision has an empty down-revision.
    #[error("migration chain has no root revision")]
    MissingRoot,

    /// More than one revision has an empty down-revision.
    #[error("migration chain has more than one root revision")]
    MultipleRoots,

    /// A revision references a parent that is not in the chain.
    #[error("revision `{id}` references unknown parent `{parent}`")]
    UnknownParent {
        /// The revision with the dangling reference.
        id: RevisionId,
        /// The missing parent id.
        parent: RevisionId,
    },

    /// Two revisions claim the same parent.
    #[error("revisions fork at parent `{parent}`")]
    Fork {
        /// The contested parent id.
        parent: RevisionId,
    },

    /// Revisions unreachable from the root reference each other.
    #[error("migration chain contains a cycle")]
    Cycle,

    /// A header comment is missing from a revision script.
    #[error("revision script `{file}` is missing its `{header}` header")]
    MissingHeader {
        /// The offending script file.
        file: String,
        /// The missing header name.
        header: &'static str,
    },

    /// Reading a script or configuration file failed.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// The path being read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("failed to parse `{path}`: {source}")]
    ConfigParse {
        /// The configuration file path.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The database records a revision the chain does not know.
    #[error("database records unknown revision `{revision}`")]
    UnknownApplied {
        /// The recorded revision id.
        revision: String,
    },

    /// The applied history does not match the chain order.
    #[error("applied history diverged: expected `{expected}`, found `{found}`")]
    HistoryDiverged {
        /// The revision the chain expects at this position.
        expected: RevisionId,
        /// The revision the database recorded.
        found: String,
    },

    /// A revision source changed after it was applied.
    #[error("checksum mismatch for applied revision `{id}`")]
    ChecksumMismatch {
        /// The drifted revision id.
        id: RevisionId,
    },

    /// Connecting to the target database failed.
    #[error("failed to connect to target database: {0}")]
    Connect(#[from] diesel::ConnectionError),

    /// Reading or writing the revision log failed.
    #[error("revision log error: {0}")]
    Log(#[source] diesel::result::Error),

    /// Applying a revision failed; its transaction was rolled back.
    #[error("revision `{id}` failed to apply: {source}")]
    StepFailed {
        /// The failing revision id.
        id: RevisionId,
        /// The underlying database error.
        #[source]
        source: diesel::result::Error,
    },
}
