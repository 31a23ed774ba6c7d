//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use panelmap_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: [&str; 7] = [
    "PANELMAP_DATA_DIR",
    "PANELMAP_LENGTH_FILES",
    "PANELMAP_LABELS_FILE",
    "PANELMAP_TABLES_FILE",
    "PANELMAP_PANELS_PER_METER",
    "PANELMAP_HISTORY_LIMIT",
    "PANELMAP_LOG_FILE",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
labels_file = "labels.geojson"
# Only override the label layer, leave others as defaults
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.labels_file.value, "labels.geojson");
    assert_eq!(config.labels_file.source, ConfigSource::File);
    assert_eq!(config.tables_file.value, "file.geojson");
    assert_eq!(config.tables_file.source, ConfigSource::Default);
    assert_eq!(config.history_limit.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("PANELMAP_PANELS_PER_METER", "4");
    env::set_var("PANELMAP_LENGTH_FILES", "a.csv, b.csv");
    env::set_var("PANELMAP_HISTORY_LIMIT", "12");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
panels_per_meter = 2.0
length_files = ["file.csv"]
history_limit = 50
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.panels_per_meter.value, 4.0);
    assert_eq!(config.panels_per_meter.source, ConfigSource::Environment);
    assert_eq!(config.length_files.value, vec!["a.csv", "b.csv"]);
    assert_eq!(config.history_limit.value, 12);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("PANELMAP_PANELS_PER_METER", "-2");
    env::set_var("PANELMAP_HISTORY_LIMIT", "lots");
    env::set_var("PANELMAP_LENGTH_FILES", " , ");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.panels_per_meter.value, 3.0);
    assert_eq!(config.panels_per_meter.source, ConfigSource::Default);
    assert_eq!(config.history_limit.source, ConfigSource::Default);
    assert_eq!(config.length_files.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_zero_history_limit_from_environment_is_ignored() {
    clear_env();
    env::set_var("PANELMAP_HISTORY_LIMIT", "0");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.history_limit.value, 500);
    assert_eq!(config.history_limit.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_configuration_precedence_order() {
    clear_env();
    env::set_var("PANELMAP_DATA_DIR", "/env/site");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "data_dir = \"/file/site\"").unwrap();

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.data_dir.value, PathBuf::from("/env/site"));
    assert_eq!(config.data_dir.source, ConfigSource::Environment);

    config.update_from_cli(CliConfigOverrides {
        data_dir: Some(PathBuf::from("/cli/site")),
        ..Default::default()
    });

    assert_eq!(config.data_dir.value, PathBuf::from("/cli/site"));
    assert_eq!(config.data_dir.source, ConfigSource::Cli);

    assert!(ConfigSource::Cli.precedence() > ConfigSource::Environment.precedence());
    assert!(ConfigSource::Environment.precedence() > ConfigSource::File.precedence());
    assert!(ConfigSource::File.precedence() > ConfigSource::Default.precedence());

    clear_env();
}

#[test]
fn test_configuration_source_tracking() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "tables_file = \"outlines.geojson\"").unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();
    let inspection_map = config.to_inspection_map();

    let (tables, tables_source) = &inspection_map["tables_file"];
    assert_eq!(tables, "outlines.geojson");
    assert_eq!(*tables_source, ConfigSource::File);

    let (ratio, ratio_source) = &inspection_map["panels_per_meter"];
    assert_eq!(ratio, "3");
    assert_eq!(*ratio_source, ConfigSource::Default);
}

#[test]
fn test_invalid_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invalid toml content [[[").unwrap();

    let result = LayeredConfig::with_defaults().load_from_file(file.path());

    assert!(result.is_err());
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let non_existent = temp_dir.path().join("does_not_exist.toml");

    assert!(LayeredConfig::with_defaults().load_from_file(&non_existent).is_err());
    assert!(LayeredConfig::with_defaults().load_from_optional_file(&non_existent).is_ok());
}

#[test]
#[serial]
fn test_full_configuration_workflow() {
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("panelmap.toml");
    fs::write(
        &config_path,
        r#"
log_file = "progress.jsonl"
panels_per_meter = 2.0
panel_layers = ["TABLES", "panels"]
"#,
    )
    .unwrap();

    env::set_var("PANELMAP_PANELS_PER_METER", "2.5");

    let mut config =
        LayeredConfig::with_defaults().load_from_file(&config_path).unwrap().load_from_env();

    assert_eq!(config.panels_per_meter.value, 2.5);
    assert_eq!(config.panel_layers.value, vec!["TABLES", "panels"]);

    config.update_from_cli(CliConfigOverrides {
        data_dir: Some(temp_dir.path().to_path_buf()),
        panels_per_meter: Some(3.5),
        ..Default::default()
    });

    assert_eq!(config.panels_per_meter.value, 3.5);
    assert_eq!(config.panels_per_meter.source, ConfigSource::Cli);
    assert_eq!(config.log_path(), temp_dir.path().join("progress.jsonl"));

    clear_env();
}
