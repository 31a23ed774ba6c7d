//! Rendering of command results for a terminal or as JSON

use console::style;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

use crate::errors::CliError;

/// Severity of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
}

impl Level {
    fn name(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
        }
    }

    fn symbol(self) -> String {
        match self {
            Level::Success => style("✓").green().bold().to_string(),
            Level::Info => style("ℹ").blue().bold().to_string(),
            Level::Warning => style("⚠").yellow().bold().to_string(),
        }
    }
}

/// Format a status message; JSON messages stay on one line so a session
/// transcript reads as JSON lines
fn status_line(level: Level, message: impl Display, json: bool) -> String {
    if json {
        serde_json::json!({ "status": level.name(), "message": message.to_string() }).to_string()
    } else {
        format!("{} {}", level.symbol(), message)
    }
}

pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: impl Display) {
        println!("{}", status_line(Level::Success, message, self.json));
    }

    pub fn info(&self, message: impl Display) {
        println!("{}", status_line(Level::Info, message, self.json));
    }

    /// Warnings go to stderr so they never corrupt JSON on stdout
    pub fn warning(&self, message: impl Display) {
        eprintln!("{}", status_line(Level::Warning, message, self.json));
    }

    /// Report a recoverable error with its suggestions
    pub fn cli_error(&self, error: &CliError) {
        if self.json {
            let output = serde_json::json!({
                "status": "error",
                "message": error.message,
                "suggestions": error.suggestions,
            });
            eprintln!("{}", output);
        } else {
            error.display();
        }
    }

    pub fn table<T: Tabled + Serialize>(&self, rows: Vec<T>) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "data": rows }))?);
        } else if rows.is_empty() {
            println!("{}", style("(no data)").dim());
        } else {
            println!("{}", Table::new(rows).with(Style::rounded()).to_string());
        }
        Ok(())
    }

    /// Print a document as-is, whatever the mode
    pub fn document<T: Serialize>(&self, document: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(document)?);
        Ok(())
    }

    /// Print a command result wrapped in a success envelope
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let output = serde_json::json!({ "status": "success", "data": data });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    /// A labelled value; one `{key: value}` object per line in JSON mode
    pub fn field(&self, key: impl Display, value: impl Display) {
        if self.json {
            println!("{}", serde_json::json!({ key.to_string(): value.to_string() }));
        } else {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn heading(&self, title: impl Display) {
        if !self.json {
            println!("\n{}", style(title).bold().underlined());
        }
    }
}
