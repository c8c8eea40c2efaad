//! Adapter implementations for instance lifecycle ports.

pub(crate) mod process;
