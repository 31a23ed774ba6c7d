//! Command implementations

mod config;
mod enrich;
mod labels;
mod log;
mod track;

use crate::cli::{Cli, Commands};
use crate::errors;
use crate::output::OutputWriter;
use anyhow::Result;
use panelmap_core::config::LayeredConfig;
use panelmap_core::Error;
use panelmap_tracker::{build_site, FsSourceReader, LoadReport, Site, SiteData, SiteLoader};

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match &cli.command {
        Commands::Enrich(args) => enrich::execute(&cli, args, &output).await,
        Commands::Labels(args) => labels::execute(&cli, args, &output).await,
        Commands::Track(args) => track::execute(&cli, args, &output).await,
        Commands::Log(args) => log::execute(&cli, args, &output).await,
        Commands::Config => config::execute(&cli, &output),
    }
}

/// Read the three sources from the configured data directory
async fn load_data(config: &LayeredConfig) -> Result<SiteData> {
    let reader = FsSourceReader::open(config.data_dir.value.clone()).await.map_err(|e| match e {
        Error::DataDirNotFound { path } => anyhow::Error::new(errors::data_dir_not_found(&path)),
        other => anyhow::Error::new(other),
    })?;

    let loader = SiteLoader::new(reader, config);
    Ok(loader.load().await)
}

/// Load the site and run the enrichment pipeline
async fn load_site(config: &LayeredConfig, output: &OutputWriter) -> Result<Site> {
    let data = load_data(config).await?;
    let site = build_site(&data, config).map_err(|e| match e {
        Error::NoData { tried } => anyhow::Error::new(errors::no_data(&config.data_dir.value, &tried)),
        other => anyhow::Error::new(other),
    })?;

    report_warnings(&site.report, output);
    Ok(site)
}

fn report_warnings(report: &LoadReport, output: &OutputWriter) {
    if !report.is_degraded() {
        return;
    }
    output.warning("Partial data loaded, results are incomplete");
    for warning in &report.warnings {
        output.warning(warning);
    }
}
