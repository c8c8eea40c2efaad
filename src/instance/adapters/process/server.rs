//! Spawns and stops the `postgres` server process.

use super::{demote_command, tool_path};
use crate::instance::domain::InstanceError;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Spawns the server against an initialised data directory. Configuration
/// comes entirely from the rendered `postgresql.conf`.
pub(crate) fn spawn_server(
    bin_dir: Option<&Path>,
    data_dir: &Path,
) -> Result<Child, InstanceError> {
    let mut cmd = Command::new(tool_path(bin_dir, "postgres"));
    cmd.arg("-D")
        .arg(data_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    demote_command(&mut cmd)?;
    cmd.spawn().map_err(|source| InstanceError::ToolSpawn {
        tool: "postgres",
        source,
    })
}

/// Stops the server and waits for it to exit.
///
/// Graceful shutdown sends SIGTERM, under which the server waits for clients
/// to disconnect; the non-graceful path kills outright so lingering client
/// connections cannot stall teardown.
pub(crate) fn stop_server(mut server: Child, graceful: bool) -> Result<(), InstanceError> {
    if graceful {
        request_graceful_exit(&server)?;
    } else {
        server.kill().map_err(|source| InstanceError::ToolSpawn {
            tool: "postgres",
            source,
        })?;
    }
    server
        .wait_with_output()
        .map_err(|source| InstanceError::ToolSpawn {
            tool: "postgres",
            source,
        })?;
    Ok(())
}

#[cfg(unix)]
fn request_graceful_exit(server: &Child) -> Result<(), InstanceError> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let pid = i32::try_from(server.id())
        .map_err(|_| InstanceError::Signal("server pid out of range".to_owned()))?;
    kill(Pid::from_raw(pid), Signal::SIGTERM)
        .map_err(|err| InstanceError::Signal(err.to_string()))
}

#[cfg(not(unix))]
fn request_graceful_exit(_server: &Child) -> Result<(), InstanceError> {
    Err(InstanceError::Signal(
        "graceful shutdown is only supported on Unix".to_owned(),
    ))
}
