//! PanelMap CLI - Command-line interface
//!
//! Enriches site data and tracks installation progress from the terminal.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod session;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use errors::CliError;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create async runtime
    let runtime = tokio::runtime::Runtime::new()?;

    // Execute the command
    if let Err(err) = runtime.block_on(async { commands::execute(cli).await }) {
        match err.downcast_ref::<CliError>() {
            Some(cli_error) => {
                cli_error.display();
                std::process::exit(1);
            }
            None => return Err(err),
        }
    }

    Ok(())
}
