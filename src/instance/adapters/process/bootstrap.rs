//! Data directory initialisation via `initdb`.

use super::{DATA_DIR_NAME, demote_command, grant_paths, run_captured, tool_path};
use crate::instance::domain::{InstanceConfig, InstanceError};
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const PASSWORD_FILE: &str = "superuser_password";
const TEMP_PREFIX: &str = "pgnest-";

/// Freshly initialised server directory layout.
pub(crate) struct DataDir {
    /// Owning handle for the whole temp directory.
    pub(crate) temp: TempDir,
    /// The `initdb`-created data directory inside it.
    pub(crate) data_dir: PathBuf,
}

/// Creates the temp directory and runs `initdb` into it.
pub(crate) fn init_data_dir(config: &InstanceConfig) -> Result<DataDir, InstanceError> {
    let temp = config.data_dir_prefix().map_or_else(
        || TempDir::with_prefix(TEMP_PREFIX),
        |base| TempDir::with_prefix_in(TEMP_PREFIX, base),
    )
    .map_err(InstanceError::TempDir)?;

    // initdb refuses passwords on the command line; it reads a file.
    let password_file = temp.path().join(PASSWORD_FILE);
    std::fs::write(&password_file, config.password()).map_err(InstanceError::TempDir)?;

    grant_paths(&[temp.path(), &password_file])?;

    let data_dir = temp.path().join(DATA_DIR_NAME);
    let mut cmd = Command::new(tool_path(config.bin_dir(), "initdb"));
    cmd.arg("-D")
        .arg(&data_dir)
        .arg("-N")
        .arg("--username")
        .arg(config.superuser())
        .arg("--pwfile")
        .arg(&password_file);
    for (key, value) in config.initdb_args() {
        cmd.arg(format!("--{key}={value}"));
    }
    demote_command(&mut cmd)?;
    run_captured(&mut cmd, "initdb")?;

    Ok(DataDir { temp, data_dir })
}
