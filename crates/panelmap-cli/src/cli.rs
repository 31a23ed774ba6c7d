use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PanelMap - Solar site enrichment and progress tracking
#[derive(Parser, Debug)]
#[command(name = "panelmap")]
#[command(about = "Correlate solar site data and track installation progress", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the cable lengths, labels and table outlines
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to panelmap.toml in the data directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Panels attributed per meter of cable
    #[arg(long, global = true, value_name = "RATIO", value_parser = parse_ratio)]
    pub panels_per_meter: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the enrichment pipeline over the site data
    Enrich(EnrichArgs),

    /// Snap labels onto panel lines and compute their display angle
    Labels(LabelsArgs),

    /// Start an interactive status tracking session
    Track(TrackArgs),

    /// Show or clear the daily work log
    Log(LogArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct EnrichArgs {
    /// Write inverters.geojson, tables.geojson and table_labels.json into this directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct LabelsArgs {
    /// Write the repositioned FeatureCollection to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct TrackArgs {
    /// Daily log file (relative paths resolve against the data directory)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct LogArgs {
    /// Remove every record from the log
    #[arg(long)]
    pub reset: bool,

    /// Daily log file (relative paths resolve against the data directory)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    panelmap_core::config::parse_panels_per_meter(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["panelmap", "enrich", "--json", "--data-dir", "site"]);
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("site")));
        assert!(matches!(cli.command, Commands::Enrich(EnrichArgs { out: None })));
    }

    #[test]
    fn test_rejects_non_positive_ratio() {
        assert!(Cli::try_parse_from(["panelmap", "--panels-per-meter", "0", "config"]).is_err());
        let cli = Cli::parse_from(["panelmap", "--panels-per-meter", "2.5", "config"]);
        assert_eq!(cli.panels_per_meter, Some(2.5));
    }

    #[test]
    fn test_log_reset_flag() {
        let cli = Cli::parse_from(["panelmap", "log", "--reset"]);
        match cli.command {
            Commands::Log(args) => assert!(args.reset),
            other => panic!("Expected log command, got {:?}", other),
        }
    }
}
