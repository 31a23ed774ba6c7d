use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the data directory
pub const CONFIG_FILE_NAME: &str = "panelmap.toml";

/// Layers whose line strings are treated as table outlines when snapping labels
pub const DEFAULT_PANEL_LAYERS: [&str; 5] = ["SOMBREADO SUB 06", "panels", "panel", "inv", "inv point"];

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for PanelMap
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Directory holding the three data sources
    pub data_dir: ConfigValue<PathBuf>,
    /// Cable length files, tried in order
    pub length_files: ConfigValue<Vec<String>>,
    pub labels_file: ConfigValue<String>,
    pub tables_file: ConfigValue<String>,
    /// Panels attributed per meter of cable
    pub panels_per_meter: ConfigValue<f64>,
    /// Maximum number of snapshots kept on each history stack
    pub history_limit: ConfigValue<usize>,
    /// Daily log location, relative paths resolve against the data directory
    pub log_file: ConfigValue<PathBuf>,
    pub panel_layers: ConfigValue<Vec<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            data_dir: ConfigValue::new(PathBuf::from("."), ConfigSource::Default),
            length_files: ConfigValue::new(
                vec!["LV.CSV".to_string(), "lv.csv".to_string()],
                ConfigSource::Default,
            ),
            labels_file: ConfigValue::new("text.geojson".to_string(), ConfigSource::Default),
            tables_file: ConfigValue::new("file.geojson".to_string(), ConfigSource::Default),
            panels_per_meter: ConfigValue::new(3.0, ConfigSource::Default),
            history_limit: ConfigValue::new(500, ConfigSource::Default),
            log_file: ConfigValue::new(PathBuf::from("daily_log.jsonl"), ConfigSource::Default),
            panel_layers: ConfigValue::new(
                DEFAULT_PANEL_LAYERS.iter().map(|s| s.to_string()).collect(),
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig = toml::from_str(&content).map_err(|e| Error::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;

        if let Some(panels_per_meter) = file_config.panels_per_meter {
            validate_panels_per_meter(panels_per_meter)?;
        }

        if let Some(history_limit) = file_config.history_limit {
            validate_history_limit(history_limit)?;
        }

        let no_length_files = file_config
            .length_files
            .as_ref()
            .is_some_and(|files| files.iter().all(|f| f.trim().is_empty()));
        if no_length_files {
            return Err(Error::ConfigMissing { key: "length_files".to_string() });
        }
        if file_config.labels_file.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(Error::ConfigMissing { key: "labels_file".to_string() });
        }
        if file_config.tables_file.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(Error::ConfigMissing { key: "tables_file".to_string() });
        }

        // Update values from file
        if let Some(data_dir) = file_config.data_dir {
            self.data_dir.update(data_dir, ConfigSource::File);
        }

        if let Some(length_files) = file_config.length_files {
            self.length_files.update(length_files, ConfigSource::File);
        }

        if let Some(labels_file) = file_config.labels_file {
            self.labels_file.update(labels_file, ConfigSource::File);
        }

        if let Some(tables_file) = file_config.tables_file {
            self.tables_file.update(tables_file, ConfigSource::File);
        }

        if let Some(panels_per_meter) = file_config.panels_per_meter {
            self.panels_per_meter.update(panels_per_meter, ConfigSource::File);
        }

        if let Some(history_limit) = file_config.history_limit {
            self.history_limit.update(history_limit, ConfigSource::File);
        }

        if let Some(log_file) = file_config.log_file {
            self.log_file.update(log_file, ConfigSource::File);
        }

        if let Some(panel_layers) = file_config.panel_layers {
            self.panel_layers.update(panel_layers, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the config file only if it exists
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            self.load_from_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // PANELMAP_DATA_DIR
        if let Ok(dir) = env::var("PANELMAP_DATA_DIR") {
            self.data_dir.update(PathBuf::from(dir), ConfigSource::Environment);
        }

        // PANELMAP_LENGTH_FILES
        if let Ok(files) = env::var("PANELMAP_LENGTH_FILES") {
            let files = parse_list(&files);
            if files.is_empty() {
                tracing::warn!("Ignoring empty PANELMAP_LENGTH_FILES");
            } else {
                self.length_files.update(files, ConfigSource::Environment);
            }
        }

        // PANELMAP_LABELS_FILE
        if let Ok(file) = env::var("PANELMAP_LABELS_FILE") {
            self.labels_file.update(file, ConfigSource::Environment);
        }

        // PANELMAP_TABLES_FILE
        if let Ok(file) = env::var("PANELMAP_TABLES_FILE") {
            self.tables_file.update(file, ConfigSource::Environment);
        }

        // PANELMAP_PANELS_PER_METER
        if let Ok(value) = env::var("PANELMAP_PANELS_PER_METER") {
            match parse_panels_per_meter(&value) {
                Ok(ratio) => self.panels_per_meter.update(ratio, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PANELMAP_PANELS_PER_METER value '{}': expected a positive number",
                    value
                ),
            }
        }

        // PANELMAP_HISTORY_LIMIT
        if let Ok(value) = env::var("PANELMAP_HISTORY_LIMIT") {
            match parse_history_limit(&value) {
                Ok(limit) => self.history_limit.update(limit, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PANELMAP_HISTORY_LIMIT value '{}': expected a positive integer",
                    value
                ),
            }
        }

        // PANELMAP_LOG_FILE
        if let Ok(file) = env::var("PANELMAP_LOG_FILE") {
            self.log_file.update(PathBuf::from(file), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir.update(data_dir, ConfigSource::Cli);
        }

        if let Some(panels_per_meter) = overrides.panels_per_meter {
            self.panels_per_meter.update(panels_per_meter, ConfigSource::Cli);
        }

        if let Some(log_file) = overrides.log_file {
            self.log_file.update(log_file, ConfigSource::Cli);
        }
    }

    /// Daily log path resolved against the data directory
    pub fn log_path(&self) -> PathBuf {
        if self.log_file.value.is_absolute() {
            self.log_file.value.clone()
        } else {
            self.data_dir.value.join(&self.log_file.value)
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "data_dir".to_string(),
            (self.data_dir.value.display().to_string(), self.data_dir.source),
        );

        map.insert(
            "length_files".to_string(),
            (self.length_files.value.join(", "), self.length_files.source),
        );

        map.insert(
            "labels_file".to_string(),
            (self.labels_file.value.clone(), self.labels_file.source),
        );

        map.insert(
            "tables_file".to_string(),
            (self.tables_file.value.clone(), self.tables_file.source),
        );

        map.insert(
            "panels_per_meter".to_string(),
            (self.panels_per_meter.value.to_string(), self.panels_per_meter.source),
        );

        map.insert(
            "history_limit".to_string(),
            (self.history_limit.value.to_string(), self.history_limit.source),
        );

        map.insert(
            "log_file".to_string(),
            (self.log_file.value.display().to_string(), self.log_file.source),
        );

        map.insert(
            "panel_layers".to_string(),
            (self.panel_layers.value.join(", "), self.panel_layers.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    length_files: Option<Vec<String>>,
    labels_file: Option<String>,
    tables_file: Option<String>,
    panels_per_meter: Option<f64>,
    history_limit: Option<usize>,
    log_file: Option<PathBuf>,
    panel_layers: Option<Vec<String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub panels_per_meter: Option<f64>,
    pub log_file: Option<PathBuf>,
}

/// Parse the panels-per-meter multiplier from string
pub fn parse_panels_per_meter(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|_| Error::ConfigInvalid {
        key: "panels_per_meter".to_string(),
        reason: format!("Invalid number: {}", s),
    })?;
    validate_panels_per_meter(value)?;
    Ok(value)
}

fn validate_panels_per_meter(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigInvalid {
            key: "panels_per_meter".to_string(),
            reason: format!("Must be a positive number, got {}", value),
        })
    }
}

/// Parse a history limit from a string; zero would disable undo entirely
pub fn parse_history_limit(s: &str) -> Result<usize> {
    let value = s.trim().parse::<usize>().map_err(|_| Error::ConfigInvalid {
        key: "history_limit".to_string(),
        reason: format!("Invalid integer: {}", s),
    })?;
    validate_history_limit(value)?;
    Ok(value)
}

fn validate_history_limit(value: usize) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::ConfigInvalid {
            key: "history_limit".to_string(),
            reason: "Must keep at least one snapshot, got 0".to_string(),
        })
    }
}

/// Split a comma-separated list, dropping empty entries
fn parse_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.length_files.value, vec!["LV.CSV", "lv.csv"]);
        assert_eq!(config.labels_file.value, "text.geojson");
        assert_eq!(config.tables_file.value, "file.geojson");
        assert_eq!(config.panels_per_meter.value, 3.0);
        assert_eq!(config.panels_per_meter.source, ConfigSource::Default);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
length_files = ["cables.csv"]
panels_per_meter = 2.5
history_limit = 20
panel_layers = ["TABLES"]
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.length_files.value, vec!["cables.csv"]);
        assert_eq!(config.length_files.source, ConfigSource::File);
        assert_eq!(config.panels_per_meter.value, 2.5);
        assert_eq!(config.history_limit.value, 20);
        assert_eq!(config.panel_layers.value, vec!["TABLES"]);
        assert_eq!(config.labels_file.source, ConfigSource::Default);
    }

    #[test]
    fn test_file_rejects_non_positive_multiplier() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "panels_per_meter = 0.0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn test_file_rejects_zero_history_limit() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = 0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(Error::ConfigInvalid { ref key, .. }) if key == "history_limit"));
    }

    #[test]
    fn test_file_with_empty_source_names_is_missing_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "length_files = []").unwrap();
        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(Error::ConfigMissing { ref key }) if key == "length_files"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tables_file = \"  \"").unwrap();
        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(Error::ConfigMissing { ref key }) if key == "tables_file"));
    }

    #[test]
    fn test_parse_history_limit() {
        assert_eq!(parse_history_limit(" 25 ").unwrap(), 25);
        assert!(parse_history_limit("0").is_err());
        assert!(parse_history_limit("-3").is_err());
        assert!(parse_history_limit("many").is_err());
    }

    #[test]
    fn test_missing_optional_file_keeps_defaults() {
        let config = LayeredConfig::with_defaults()
            .load_from_optional_file("/nonexistent/panelmap.toml")
            .unwrap();
        assert_eq!(config.data_dir.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            data_dir: Some(PathBuf::from("/srv/site")),
            panels_per_meter: None,
            log_file: None,
        });

        assert_eq!(config.data_dir.value, PathBuf::from("/srv/site"));
        assert_eq!(config.data_dir.source, ConfigSource::Cli);
        assert_eq!(config.panels_per_meter.source, ConfigSource::Default);
        assert_eq!(config.log_path(), PathBuf::from("/srv/site/daily_log.jsonl"));
    }

    #[test]
    fn test_parse_panels_per_meter() {
        assert_eq!(parse_panels_per_meter("3").unwrap(), 3.0);
        assert_eq!(parse_panels_per_meter(" 1.5 ").unwrap(), 1.5);
        assert!(parse_panels_per_meter("-1").is_err());
        assert!(parse_panels_per_meter("many").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("data_dir"));
        assert!(map.contains_key("panel_layers"));

        let (files, source) = &map["length_files"];
        assert_eq!(files, "LV.CSV, lv.csv");
        assert_eq!(*source, ConfigSource::Default);
    }
}
