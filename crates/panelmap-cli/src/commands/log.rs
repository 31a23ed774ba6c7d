//! Log command implementation

use crate::cli::{Cli, LogArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::LogRow;
use anyhow::{Context, Result};
use panelmap_core::ports::DailyLogStore;
use panelmap_tracker::JsonLinesLogStore;

pub async fn execute(cli: &Cli, args: &LogArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli, args.log_file.clone())?;
    let store = JsonLinesLogStore::new(config.log_path());

    if args.reset {
        store.reset().await.context("Failed to clear the daily log")?;
        output.success(format!("Cleared daily log {}", store.path().display()));
        return Ok(());
    }

    let records = store.list().await.context("Failed to read the daily log")?;
    if records.is_empty() && !output.is_json() {
        output.info(format!("No records in {}", store.path().display()));
        return Ok(());
    }

    output.heading("Daily Log");
    output.table(records.into_iter().map(LogRow::from).collect())
}
