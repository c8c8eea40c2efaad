//! Instance lifecycle services.

mod lifecycle;

pub use lifecycle::EphemeralPostgres;
