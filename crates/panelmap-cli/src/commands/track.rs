//! Track command implementation

use super::load_site;
use crate::cli::{Cli, TrackArgs};
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use crate::session::{Session, SessionCommand};
use anyhow::Result;
use chrono::Local;
use panelmap_tracker::{JsonLinesLogStore, StatusHistory};
use std::ops::ControlFlow;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn execute(cli: &Cli, args: &TrackArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli, args.log_file.clone())?;
    let site = load_site(&config, output).await?;

    let history = StatusHistory::new(site.inverters.clone(), config.history_limit.value);
    let store = JsonLinesLogStore::new(config.log_path());
    let mut session = Session::new(history, &site.lengths, &store, output);

    output.info(format!(
        "Tracking {} inverters, logging to {}. Type 'help' for commands.",
        site.inverters.len(),
        store.path().display()
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line, Local::now().date_naive()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(reason) => {
                output.cli_error(&errors::invalid_command(line.trim(), &reason));
                continue;
            }
        };

        if let ControlFlow::Break(()) = session.run(command).await? {
            break;
        }
    }

    tracing::debug!("Tracking session ended");
    Ok(())
}
