//! Revision identity, source, and checksums.

use super::error::MigrationError;
use sha2::{Digest, Sha256};
use std::fmt;

const MAX_ID_LEN: usize = 64;

/// Opaque revision identifier linking a chain of schema changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId(String);

impl RevisionId {
    /// Creates a validated revision id.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::InvalidRevisionId`] when the value is empty,
    /// too long, or contains characters outside `[A-Za-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, MigrationError> {
        let id = value.into();
        let reason = if id.is_empty() {
            Some("id must not be empty")
        } else if id.len() > MAX_ID_LEN {
            Some("id exceeds 64 bytes")
        } else if !id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            Some("id may only contain letters, digits, underscores, and dashes")
        } else {
            None
        };
        if let Some(found) = reason {
            return Err(MigrationError::InvalidRevisionId { value: id, reason: found });
        }
        Ok(Self(id))
    }

    /// Returns the id as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 digest of a revision source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Computes the digest of the given bytes.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Returns the lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::with_capacity(self.0.len() * 2);
        for byte in &self.0 {
            rendered.push_str(&format!("{byte:02x}"));
        }
        f.write_str(&rendered)
    }
}

/// One schema change in a migration chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    id: RevisionId,
    down_revision: Option<RevisionId>,
    source: String,
    checksum: Checksum,
}

impl Revision {
    /// Creates a revision, computing the checksum of its source text.
    #[must_use]
    pub fn new(id: RevisionId, down_revision: Option<RevisionId>, source: String) -> Self {
        let checksum = Checksum::of(source.as_bytes());
        Self {
            id,
            down_revision,
            source,
            checksum,
        }
    }

    /// Returns the revision id.
    #[must_use]
    pub const fn id(&self) -> &RevisionId {
        &self.id
    }

    /// Returns the parent revision id; `None` marks the chain root.
    #[must_use]
    pub const fn down_revision(&self) -> Option<&RevisionId> {
        self.down_revision.as_ref()
    }

    /// Returns the SQL source, headers included.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.source
    }

    /// Returns the source checksum.
    #[must_use]
    pub const fn checksum(&self) -> &Checksum {
        &self.checksum
    }
}
