//! Loads revision scripts from a directory.
//!
//! Revision scripts are `*.sql` files opening with header comments:
//!
//! ```sql
//! -- revision: 0002_index_open_tasks
//! -- down-revision: 0001_create_tasks
//! ```
//!
//! A down-revision of `none` marks the chain root.

use crate::migration::domain::{MigrationError, Revision, RevisionId};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

const SCRIPT_EXTENSION: &str = ".sql";
const REVISION_HEADER: &str = "-- revision:";
const DOWN_HEADER: &str = "-- down-revision:";
const ROOT_MARKER: &str = "none";

/// Capability-scoped source of revision scripts.
#[derive(Debug)]
pub struct DirectorySource {
    dir: Dir,
    path: Utf8PathBuf,
}

impl DirectorySource {
    /// Opens a script directory.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Io`] when the directory cannot be opened.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, MigrationError> {
        let path_ref = path.as_ref();
        let dir = Dir::open_ambient_dir(path_ref, ambient_authority()).map_err(|source| {
            MigrationError::Io {
                path: path_ref.to_string(),
                source,
            }
        })?;
        Ok(Self {
            dir,
            path: path_ref.to_owned(),
        })
    }

    /// Reads and parses every revision script in the directory.
    ///
    /// Files are read in name order so error reporting is deterministic; the
    /// chain itself is ordered by the revision links, not the file names.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Io`] on read failures and
    /// [`MigrationError::MissingHeader`] or
    /// [`MigrationError::InvalidRevisionId`] on malformed headers.
    pub fn load(&self) -> Result<Vec<Revision>, MigrationError> {
        let io_error = |source| MigrationError::Io {
            path: self.path.to_string(),
            source,
        };

        let mut names: Vec<String> = Vec::new();
        for entry in self.dir.entries().map_err(io_error)? {
            let dir_entry = entry.map_err(io_error)?;
            let file_name = dir_entry.file_name().map_err(io_error)?;
            if file_name.ends_with(SCRIPT_EXTENSION) {
                names.push(file_name);
            }
        }
        names.sort();

        let mut revisions = Vec::with_capacity(names.len());
        for name in &names {
            let source = self
                .dir
                .read_to_string(name)
                .map_err(|source| MigrationError::Io {
                    path: name.clone(),
                    source,
                })?;
            let (id, down_revision) = parse_header(name, &source)?;
            revisions.push(Revision::new(id, down_revision, source));
        }
        Ok(revisions)
    }
}

fn parse_header(
    file: &str,
    source: &str,
) -> Result<(RevisionId, Option<RevisionId>), MigrationError> {
    let mut id: Option<RevisionId> = None;
    let mut down: Option<Option<RevisionId>> = None;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with("--") {
            break;
        }
        if let Some(value) = trimmed.strip_prefix(REVISION_HEADER) {
            id = Some(RevisionId::new(value.trim())?);
        } else if let Some(value) = trimmed.strip_prefix(DOWN_HEADER) {
            let parent = value.trim();
            down = if parent == ROOT_MARKER {
                Some(None)
            } else {
                Some(Some(RevisionId::new(parent)?))
            };
        }
    }

    let found_id = id.ok_or_else(|| MigrationError::MissingHeader {
        file: file.to_owned(),
        header: "revision",
    })?;
    let found_down = down.ok_or_else(|| MigrationError::MissingHeader {
        file: file.to_owned(),
        header: "down-revision",
    })?;
    Ok((found_id, found_down))
}
