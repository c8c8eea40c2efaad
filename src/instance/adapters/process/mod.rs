//! Process adapter invoking the PostgreSQL binaries.
//!
//! Everything that touches `initdb`, `postgres`, `pg_dump`, or `psql` lives
//! here; the lifecycle service stays free of process plumbing.

mod bootstrap;
mod conf;
mod server;
mod tools;

pub(crate) use bootstrap::{DataDir, init_data_dir};
pub(crate) use conf::append_server_conf;
pub(crate) use server::{spawn_server, stop_server};
pub(crate) use tools::{dump_database, load_database};

use crate::instance::domain::InstanceError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Name of the server data directory inside the temp directory.
pub(crate) const DATA_DIR_NAME: &str = "pg_data";

fn tool_path(bin_dir: Option<&Path>, tool: &str) -> PathBuf {
    bin_dir.map_or_else(|| PathBuf::from(tool), |dir| dir.join(tool))
}

/// Runs a command to completion, mapping spawn failures and non-zero exits.
fn run_captured(cmd: &mut Command, tool: &'static str) -> Result<(), InstanceError> {
    let output = cmd
        .output()
        .map_err(|source| InstanceError::ToolSpawn { tool, source })?;
    if !output.status.success() {
        return Err(InstanceError::ToolFailed {
            tool,
            status: output.status,
            detail: combined_output(&output),
        });
    }
    Ok(())
}

fn combined_output(output: &Output) -> String {
    format!(
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout).trim(),
        String::from_utf8_lossy(&output.stderr).trim(),
    )
}

// postgres refuses to run as root, so when the effective user is root the
// data directory and the spawned commands are handed to the `postgres`
// system user.
#[cfg(unix)]
mod privileges {
    use crate::instance::domain::InstanceError;
    use nix::unistd::{Uid, User};
    use std::os::unix::process::CommandExt;
    use std::path::Path;
    use std::process::Command;

    const UNPRIVILEGED_USER: &str = "postgres";

    fn effective_is_root() -> bool {
        Uid::effective().is_root()
    }

    fn unprivileged_user() -> Result<User, InstanceError> {
        User::from_name(UNPRIVILEGED_USER)
            .map_err(|err| InstanceError::SuperuserLookup(err.to_string()))?
            .ok_or_else(|| {
                InstanceError::SuperuserLookup(format!("user `{UNPRIVILEGED_USER}` not found"))
            })
    }

    pub(super) fn demote_command(cmd: &mut Command) -> Result<(), InstanceError> {
        if !effective_is_root() {
            return Ok(());
        }
        let user = unprivileged_user()?;
        cmd.uid(user.uid.as_raw()).gid(user.gid.as_raw());
        Ok(())
    }

    pub(super) fn grant_paths(paths: &[&Path]) -> Result<(), InstanceError> {
        if !effective_is_root() {
            return Ok(());
        }
        let user = unprivileged_user()?;
        for path in paths {
            std::os::unix::fs::chown(path, Some(user.uid.as_raw()), Some(user.gid.as_raw()))
                .map_err(InstanceError::TempDir)?;
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod privileges {
    use crate::instance::domain::InstanceError;
    use std::path::Path;
    use std::process::Command;

    pub(super) fn demote_command(_cmd: &mut Command) -> Result<(), InstanceError> {
        Ok(())
    }

    pub(super) fn grant_paths(_paths: &[&Path]) -> Result<(), InstanceError> {
        Ok(())
    }
}

use privileges::{demote_command, grant_paths};
