use console::style;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing data directory
pub fn data_dir_not_found(path: &Path) -> CliError {
    CliError::new("Data directory not found")
        .with_context(format!("The site data directory does not exist.\n\nPath: {}", path.display()))
        .with_suggestion("Pass the directory explicitly: panelmap --data-dir <DIR> enrich")
        .with_suggestion("Or set PANELMAP_DATA_DIR")
        .with_help("Run: panelmap --help")
}

/// Create error for a load where no source could be read
pub fn no_data(data_dir: &Path, tried: &[String]) -> CliError {
    let mut context = format!(
        "None of the site data sources could be read.\n\nData directory: {}",
        data_dir.display()
    );
    for attempt in tried {
        context.push_str(&format!("\n  - {}", attempt));
    }

    CliError::new("No site data available")
        .with_context(context)
        .with_suggestion("Check that LV.CSV, text.geojson and file.geojson exist in the data directory")
        .with_suggestion("Or point to other file names in panelmap.toml")
        .with_help("Run: panelmap config")
}

/// Create error for an unknown inverter identifier
pub fn feature_not_found(id: &str) -> CliError {
    CliError::new(format!("No inverter named '{}'", id))
        .with_suggestion("List known inverters with: list")
        .with_suggestion("Identifiers match as written or in normalized form (INV 01 = INV1)")
}

/// Create error for a malformed session command
pub fn invalid_command(line: &str, reason: &str) -> CliError {
    CliError::new(format!("Cannot run '{}': {}", line, reason)).with_help("Type: help")
}
