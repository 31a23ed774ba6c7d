//! Enrich command implementation

use super::load_site;
use crate::cli::{Cli, EnrichArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{EnrichOutput, InverterRow};
use anyhow::{Context, Result};
use panelmap_tracker::Site;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub async fn execute(cli: &Cli, args: &EnrichArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli, None)?;
    let site = load_site(&config, output).await?;

    let written = match &args.out {
        Some(dir) => write_outputs(&site, dir)?,
        None => Vec::new(),
    };

    if output.is_json() {
        output.result(EnrichOutput {
            data_dir: config.data_dir.value.display().to_string(),
            inverters: site.inverters.len(),
            tables: site.tables.len(),
            table_labels: site.table_labels.len(),
            cable_lengths: site.lengths.len(),
            skipped_rows: site.report.skipped_rows,
            skipped_labels: site.report.skipped_labels,
            skipped_tables: site.report.skipped_tables,
            warnings: site.report.warnings.clone(),
            written,
        })?;
        return Ok(());
    }

    output.heading("Site Summary");
    output.field("Data directory", config.data_dir.value.display());
    output.field("Inverters", site.inverters.len());
    output.field("Tables", site.tables.len());
    output.field("Table labels", site.table_labels.len());
    output.field("Cable lengths", format!("{} ({:.1} m)", site.lengths.len(), site.lengths.total_meters()));

    let skipped = site.report.skipped_rows + site.report.skipped_labels + site.report.skipped_tables;
    if skipped > 0 {
        output.field(
            "Skipped",
            format!(
                "{} length rows, {} labels, {} table outlines",
                site.report.skipped_rows, site.report.skipped_labels, site.report.skipped_tables
            ),
        );
    }

    output.heading("Inverters");
    output.table(site.inverters.iter().map(|f| InverterRow::from_feature(f, &site.lengths)).collect())?;

    for path in &written {
        output.success(format!("Wrote {}", path));
    }
    Ok(())
}

/// Write the enriched layers into `dir`, returning the written paths
fn write_outputs(site: &Site, dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let outputs = [
        write_json(&dir.join("inverters.geojson"), &site.inverters_geojson())?,
        write_json(&dir.join("tables.geojson"), &site.tables_geojson())?,
        write_json(&dir.join("table_labels.json"), &site.table_labels)?,
    ];
    Ok(outputs.into_iter().collect())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<String> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.display().to_string())
}
