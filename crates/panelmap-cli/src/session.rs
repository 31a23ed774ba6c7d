//! Line-oriented status tracking session

use chrono::NaiveDate;
use panelmap_core::lengths::LengthTable;
use panelmap_core::models::DailySubmission;
use panelmap_core::ports::DailyLogStore;
use panelmap_core::Error;
use panelmap_tracker::{submit, HistoryState, ProgressStats, StatusHistory};
use std::ops::ControlFlow;

use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{HistoryOutput, InverterRow, StatsOutput};

pub const HELP: &[(&str, &str)] = &[
    ("toggle <id>", "Flip an inverter between pending and done"),
    ("undo", "Revert the last status change"),
    ("redo", "Reapply the last reverted change"),
    ("stats", "Show installation progress"),
    ("list", "List inverters and their status"),
    ("submit <subcontractor> <workers> [YYYY-MM-DD]", "Append today's work to the daily log"),
    ("help", "Show this help"),
    ("quit", "End the session"),
];

/// A parsed session command
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Toggle(String),
    Undo,
    Redo,
    Stats,
    List,
    Submit(DailySubmission),
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line; blank lines yield `None`.
    ///
    /// `today` is used when a submission carries no date.
    pub fn parse(line: &str, today: NaiveDate) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "toggle" | "t" if rest.is_empty() => return Err("toggle needs an inverter id".to_string()),
            "toggle" | "t" => SessionCommand::Toggle(rest.to_string()),
            "undo" | "u" => SessionCommand::Undo,
            "redo" | "r" => SessionCommand::Redo,
            "stats" => SessionCommand::Stats,
            "list" | "ls" => SessionCommand::List,
            "submit" => SessionCommand::Submit(parse_submission(rest, today)?),
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(format!("unknown command '{}'", other)),
        };
        Ok(Some(command))
    }
}

/// `<subcontractor...> <workers> [date]`, read from the end so names may contain spaces
fn parse_submission(args: &str, today: NaiveDate) -> Result<DailySubmission, String> {
    let mut tokens: Vec<&str> = args.split_whitespace().collect();

    let date = match tokens.last().and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok()) {
        Some(date) => {
            tokens.pop();
            date
        }
        None => today,
    };

    let workers = tokens
        .pop()
        .ok_or("submit needs a subcontractor and a worker count")?
        .parse::<u32>()
        .map_err(|_| "worker count must be a whole number".to_string())?;

    let subcontractor = tokens.join(" ");
    if subcontractor.is_empty() {
        return Err("submit needs a subcontractor name".to_string());
    }

    Ok(DailySubmission { date, subcontractor, workers })
}

/// State of a running session
pub struct Session<'a, S: DailyLogStore> {
    history: StatusHistory,
    lengths: &'a LengthTable,
    store: &'a S,
    output: &'a OutputWriter,
}

impl<'a, S: DailyLogStore> Session<'a, S> {
    pub fn new(
        history: StatusHistory,
        lengths: &'a LengthTable,
        store: &'a S,
        output: &'a OutputWriter,
    ) -> Self {
        Self { history, lengths, store, output }
    }

    pub fn history(&self) -> &StatusHistory {
        &self.history
    }

    /// Run one command; `Break` ends the session
    pub async fn run(&mut self, command: SessionCommand) -> anyhow::Result<ControlFlow<()>> {
        match command {
            SessionCommand::Toggle(id) => match self.history.toggle_status(&id) {
                Ok(state) => self.report("toggle", state)?,
                Err(Error::FeatureNotFound { .. }) => {
                    self.output.cli_error(&errors::feature_not_found(&id));
                }
                Err(e) => return Err(e.into()),
            },
            SessionCommand::Undo => {
                let state = self.history.undo();
                self.report("undo", state)?;
            }
            SessionCommand::Redo => {
                let state = self.history.redo();
                self.report("redo", state)?;
            }
            SessionCommand::Stats => self.stats()?,
            SessionCommand::List => {
                let rows = self
                    .history
                    .features()
                    .iter()
                    .map(|feature| InverterRow::from_feature(feature, self.lengths))
                    .collect();
                self.output.table(rows)?;
            }
            SessionCommand::Submit(submission) => {
                let record = submit(self.store, submission, self.history.features()).await?;
                self.output.success(format!(
                    "Logged {} installed panels for {} on {}",
                    record.installed_panels, record.subcontractor, record.date
                ));
            }
            SessionCommand::Help => {
                for (usage, description) in HELP {
                    self.output.field(usage, description);
                }
            }
            SessionCommand::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    fn report(&self, action: &str, state: HistoryState) -> anyhow::Result<()> {
        if self.output.is_json() {
            return self.output.result(HistoryOutput { action: action.to_string(), state });
        }
        let done = self.history.features().iter().filter(|f| f.is_done()).count();
        self.output.info(format!(
            "{}: {} of {} inverters done (undo: {}, redo: {})",
            action,
            done,
            self.history.features().len(),
            availability(state.can_undo),
            availability(state.can_redo)
        ));
        Ok(())
    }

    fn stats(&self) -> anyhow::Result<()> {
        let features = self.history.features();
        let progress = ProgressStats::compute(self.lengths, features);

        if self.output.is_json() {
            return self.output.result(StatsOutput {
                progress,
                done: features.iter().filter(|f| f.is_done()).count(),
                inverters: features.len(),
            });
        }

        self.output.field(
            "Progress",
            format!(
                "Total: {:.1}m | Completed: {:.1}m | {}% | Remaining: {:.1}m",
                progress.total_meters,
                progress.completed_meters,
                progress.completion_percentage,
                progress.remaining_meters
            ),
        );
        self.output.field("Installed panels", progress.installed_panels);
        Ok(())
    }
}

fn availability(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "none"
    }
}
