//! Script directory parsing and configuration file tests.

use crate::migration::adapters::directory::DirectorySource;
use crate::migration::config::MigrationConfig;
use crate::migration::domain::MigrationError;
use camino::Utf8Path;
use rstest::rstest;
use std::path::Path;

fn utf8(path: &Path) -> &Utf8Path {
    Utf8Path::from_path(path).expect("temp paths are valid UTF-8")
}

fn write_script(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write revision script");
}

#[rstest]
fn loads_revisions_with_parsed_headers() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_script(
        temp.path(),
        "0001_base.sql",
        "-- revision: 0001_base\n-- down-revision: none\n\nCREATE TABLE t (id INT);\n",
    );
    write_script(
        temp.path(),
        "0002_next.sql",
        "-- revision: 0002_next\n-- down-revision: 0001_base\n\nALTER TABLE t ADD COLUMN n INT;\n",
    );
    write_script(temp.path(), "README.txt", "not a script");

    let revisions = DirectorySource::open(utf8(temp.path()))
        .expect("open directory")
        .load()
        .expect("load revisions");

    assert_eq!(revisions.len(), 2);
    let base = revisions
        .iter()
        .find(|revision| revision.id().as_str() == "0001_base")
        .expect("base revision present");
    assert!(base.down_revision().is_none());
    assert!(base.sql().contains("CREATE TABLE t"));

    let next = revisions
        .iter()
        .find(|revision| revision.id().as_str() == "0002_next")
        .expect("next revision present");
    assert_eq!(
        next.down_revision().map(|parent| parent.as_str()),
        Some("0001_base")
    );
}

#[rstest]
fn missing_revision_header_is_an_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_script(
        temp.path(),
        "0001_base.sql",
        "-- down-revision: none\nCREATE TABLE t (id INT);\n",
    );

    let result = DirectorySource::open(utf8(temp.path()))
        .expect("open directory")
        .load();
    assert!(matches!(
        result,
        Err(MigrationError::MissingHeader { header: "revision", .. })
    ));
}

#[rstest]
fn missing_down_revision_header_is_an_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_script(
        temp.path(),
        "0001_base.sql",
        "-- revision: 0001_base\nCREATE TABLE t (id INT);\n",
    );

    let result = DirectorySource::open(utf8(temp.path()))
        .expect("open directory")
        .load();
    assert!(matches!(
        result,
        Err(MigrationError::MissingHeader { header: "down-revision", .. })
    ));
}

#[rstest]
fn headers_after_the_first_statement_are_ignored() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_script(
        temp.path(),
        "0001_base.sql",
        "-- revision: 0001_base\n-- down-revision: none\nSELECT 1;\n-- revision: bogus\n",
    );

    let revisions = DirectorySource::open(utf8(temp.path()))
        .expect("open directory")
        .load()
        .expect("load revisions");
    assert_eq!(
        revisions.first().map(|revision| revision.id().as_str()),
        Some("0001_base")
    );
}

#[rstest]
fn missing_directory_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("does_not_exist");
    let result = DirectorySource::open(utf8(&missing));
    assert!(matches!(result, Err(MigrationError::Io { .. })));
}

#[rstest]
fn config_file_round_trips_through_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("migrate.json");
    std::fs::write(
        &config_path,
        r#"{"script_dir": "migrations", "database_url": "postgresql://localhost:5433/appdb"}"#,
    )
    .expect("write config");

    let config = MigrationConfig::load(utf8(&config_path)).expect("load config");
    assert_eq!(config.script_dir, "migrations");
    assert_eq!(
        config.database_url.as_deref(),
        Some("postgresql://localhost:5433/appdb")
    );
}

#[rstest]
fn config_database_url_is_optional() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("migrate.json");
    std::fs::write(&config_path, r#"{"script_dir": "migrations"}"#).expect("write config");

    let config = MigrationConfig::load(utf8(&config_path)).expect("load config");
    assert!(config.database_url.is_none());
}

#[rstest]
fn malformed_config_is_a_parse_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("migrate.json");
    std::fs::write(&config_path, "{not json").expect("write config");

    let result = MigrationConfig::load(utf8(&config_path));
    assert!(matches!(result, Err(MigrationError::ConfigParse { .. })));
}
