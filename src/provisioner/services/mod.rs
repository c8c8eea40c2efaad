//! Provisioning services.

mod lease;

pub use lease::{DatabaseLease, Provisioner, TemplateSetupError};
