//! Helpful error types for CLI commands
//!
//! Every error says what went wrong, what was happening, and what to try.

use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
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

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The timetable export to parse does not exist")
            .with_suggestions([
                format!("TRY: Check the path: ls -la {}", path.display()),
                "TRY: Export the sheet tab as CSV first".to_string(),
            ])
    }

    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Make sure the export is UTF-8 encoded CSV".to_string(),
            ])
    }

    pub fn cannot_write_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot write file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestion("TRY: Check that the parent directory exists and is writable")
    }

    pub fn csv_decode_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Failed to decode CSV: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Re-export the tab with comma separators and double-quoted cells".to_string(),
                format!("TRY: Inspect the first rows: head -5 {}", path.display()),
            ])
    }

    pub fn invalid_tab_spec(spec: &str) -> Self {
        Self::new(format!("Invalid tab: '{spec}'"))
            .with_context("Tabs are given as DAY=FILE")
            .with_suggestion("TRY: timetable bundle --tab Monday=monday.csv --tab Tuesday=tuesday.csv")
    }

    pub fn invalid_config(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid configuration: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Keys live under a [parser] table, e.g. lab_departments = [\"CS & IT\"]".to_string(),
                "TRY: Remove the file to fall back to built-in defaults".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;
        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
