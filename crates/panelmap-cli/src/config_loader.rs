//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use panelmap_core::config::{CliConfigOverrides, LayeredConfig, CONFIG_FILE_NAME};
use std::path::PathBuf;

use crate::cli::Cli;

/// Load layered configuration for a command.
///
/// Environment and CLI values are applied first so the data directory is known
/// when looking for `panelmap.toml`; precedence still keeps them above the file.
pub fn load_config(cli: &Cli, log_file: Option<PathBuf>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        data_dir: cli.data_dir.clone(),
        panels_per_meter: cli.panels_per_meter,
        log_file,
    });

    let config = match &cli.config {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?,
        None => {
            let path = config.data_dir.value.join(CONFIG_FILE_NAME);
            config
                .load_from_optional_file(&path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))?
        }
    };

    tracing::debug!("Using data directory {}", config.data_dir.value.display());
    Ok(config)
}
