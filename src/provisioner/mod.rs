//! Logical database provisioning inside a running instance.
//!
//! Single-mode test isolation: each test gets a freshly created database on
//! a shared server, torn down when the test finishes. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Adapter implementations in [`adapters`]
//! - Lease orchestration in [`services`]

pub mod adapters;
pub mod domain;
pub mod services;

pub use adapters::postgres::AdminSession;
pub use domain::{DatabaseLifecycle, DatabaseName, NameAllocator, ProvisionerError};
pub use services::{DatabaseLease, Provisioner, TemplateSetupError};

#[cfg(test)]
mod tests;
