//! Domain types for migration chains.

mod chain;
mod error;
mod revision;

pub use chain::MigrationChain;
pub use error::MigrationError;
pub use revision::{Checksum, Revision, RevisionId};
