//! `pg_dump` and `psql` wrappers for dump and load support.

use super::{run_captured, tool_path};
use crate::instance::domain::InstanceError;
use std::path::Path;
use std::process::Command;

/// Dumps the database at `connection_url` to a script file via `pg_dump`.
pub(crate) fn dump_database(
    bin_dir: Option<&Path>,
    connection_url: &str,
    path: &Path,
) -> Result<(), InstanceError> {
    let mut cmd = Command::new(tool_path(bin_dir, "pg_dump"));
    cmd.arg(connection_url).arg("--file").arg(path);
    run_captured(&mut cmd, "pg_dump")
}

/// Loads a script file into the database at `connection_url` via `psql`.
///
/// `ON_ERROR_STOP` makes script errors visible in the exit status; without
/// it `psql` reports success even when statements fail.
pub(crate) fn load_database(
    bin_dir: Option<&Path>,
    connection_url: &str,
    path: &Path,
) -> Result<(), InstanceError> {
    let mut cmd = Command::new(tool_path(bin_dir, "psql"));
    cmd.arg(connection_url)
        .arg("--file")
        .arg(path)
        .args(["--variable", "ON_ERROR_STOP=1"])
        .arg("--quiet");
    run_captured(&mut cmd, "psql")
}
