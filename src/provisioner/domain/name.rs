//! Validated database names and the allocating authority that issues them.

use super::error::ProvisionerError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Longest identifier PostgreSQL stores without truncation.
const MAX_NAME_LEN: usize = 63;
/// Longest allocator prefix; leaves room for the token and counter suffixes.
const MAX_PREFIX_LEN: usize = 32;
const TOKEN_LEN: usize = 6;

/// A validated PostgreSQL database name: at most 63 bytes, starting with a
/// lowercase letter or underscore, containing only lowercase letters, digits,
/// and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Creates a validated database name.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::InvalidName`] when the value violates the
    /// identifier rules.
    pub fn new(name: impl Into<String>) -> Result<Self, ProvisionerError> {
        let value = name.into();
        if let Err(reason) = validate(&value) {
            return Err(ProvisionerError::InvalidName {
                name: value,
                reason,
            });
        }
        Ok(Self(value))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate(value: &str) -> Result<(), &'static str> {
    if value.len() > MAX_NAME_LEN {
        return Err("name exceeds 63 bytes");
    }
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err("name must not be empty");
    };
    if !(first.is_ascii_lowercase() || first == '_') {
        return Err("name must start with a lowercase letter or underscore");
    }
    if !chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
        return Err("name may only contain lowercase letters, digits, and underscores");
    }
    Ok(())
}

/// Coordinating authority issuing database names unique within this process.
///
/// Issued names are `<prefix>_<token>_<counter>`: the random token separates
/// allocators (and therefore test runs sharing one server) while the counter
/// is strictly monotonic within an allocator. Cross-process collisions are
/// left to the engine's own uniqueness enforcement.
#[derive(Debug)]
pub struct NameAllocator {
    prefix: String,
    token: String,
    counter: AtomicU64,
}

impl NameAllocator {
    /// Creates an allocator issuing names under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::InvalidPrefix`] when the prefix violates
    /// the identifier rules or exceeds 32 bytes.
    pub fn new(prefix: &str) -> Result<Self, ProvisionerError> {
        let reason = if prefix.len() > MAX_PREFIX_LEN {
            Some("prefix exceeds 32 bytes")
        } else {
            validate(prefix).err()
        };
        if let Some(found) = reason {
            return Err(ProvisionerError::InvalidPrefix {
                prefix: prefix.to_owned(),
                reason: found,
            });
        }

        let token: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(TOKEN_LEN)
            .collect();
        Ok(Self {
            prefix: prefix.to_owned(),
            token,
            counter: AtomicU64::new(0),
        })
    }

    /// Issues the next name. Safe to call from concurrent workers.
    #[must_use]
    pub fn allocate(&self) -> DatabaseName {
        let ordinal = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        // Prefix, token, and counter are all drawn from the validated
        // alphabet and the lengths are bounded, so no re-validation.
        DatabaseName(format!("{}_{}_{ordinal}", self.prefix, self.token))
    }
}
