//! Ephemeral PostgreSQL server lifecycles.
//!
//! An [`EphemeralPostgres`] owns one server process running out of a
//! temporary directory and hands back full connection details once the
//! server is ready. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Process adapter (PostgreSQL binaries) in `adapters`
//! - The lifecycle handle in [`services`]

pub(crate) mod adapters;
pub mod domain;
pub mod services;

pub use domain::{
    ConnectionProfile, InstanceConfig, InstanceError, InstanceState, MAINTENANCE_DATABASE,
};
pub use services::EphemeralPostgres;

#[cfg(test)]
mod tests;
