//! Migration runner configuration file.

use crate::migration::domain::MigrationError;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};

/// On-disk runner configuration: where the revision scripts live and which
/// database to target by default. The target URL can be overridden at run
/// time by passing a different URL to the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Directory holding the revision scripts.
    pub script_dir: String,
    /// Default target database URL.
    #[serde(default)]
    pub database_url: Option<String>,
}

impl MigrationConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Io`] when the file cannot be read and
    /// [`MigrationError::ConfigParse`] when it is not valid JSON.
    pub fn load(path: &Utf8Path) -> Result<Self, MigrationError> {
        let io_error = |source| MigrationError::Io {
            path: path.to_string(),
            source,
        };

        let parent = match path.parent() {
            Some(dir) if !dir.as_str().is_empty() => dir,
            _ => Utf8Path::new("."),
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| io_error(std::io::Error::other("path has no file name")))?;

        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let text = dir.read_to_string(file_name).map_err(io_error)?;
        serde_json::from_str(&text).map_err(|source| MigrationError::ConfigParse {
            path: path.to_string(),
            source,
        })
    }
}
