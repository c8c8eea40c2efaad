//! Renders the `postgresql.conf` overlay appended after `initdb`.

use crate::instance::domain::{InstanceConfig, InstanceError};
use minijinja::{Environment, context};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const TEMPLATE_NAME: &str = "postgresql.conf";
const TEMPLATE: &str = include_str!("postgresql.conf.j2");

#[derive(Serialize)]
struct ConfSetting {
    key: String,
    value: String,
}

/// Appends the rendered overlay to the data directory's `postgresql.conf`.
pub(crate) fn append_server_conf(
    data_dir: &Path,
    socket_dir: &Path,
    port: u16,
    config: &InstanceConfig,
) -> Result<(), InstanceError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let settings: Vec<ConfSetting> = config
        .server_settings()
        .iter()
        .map(|(key, value)| ConfSetting {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    let rendered = template.render(context! {
        port,
        socket_dir => socket_dir.display().to_string(),
        settings,
    })?;

    let conf_path = data_dir.join(TEMPLATE_NAME);
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(conf_path)
        .map_err(InstanceError::TempDir)?;
    writeln!(file).map_err(InstanceError::TempDir)?;
    file.write_all(rendered.as_bytes())
        .map_err(InstanceError::TempDir)?;
    Ok(())
}
