//! Versioned schema migrations.
//!
//! Revisions form a singly linked chain from one root to one head; the
//! runner applies the pending suffix to a target database, recording each
//! step in a `schema_revisions` table. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Script directory and revision log adapters in [`adapters`]
//! - The runner in [`services`]

pub mod adapters;
mod config;
pub mod domain;
pub mod services;

pub use config::MigrationConfig;
pub use domain::{Checksum, MigrationChain, MigrationError, Revision, RevisionId};
pub use services::{MigrationRunner, UpgradeReport};

#[cfg(test)]
mod tests;
