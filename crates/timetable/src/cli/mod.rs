//! CLI module for the timetable extractor
//!
//! `parse` and `index` work on one exported tab; `bundle` parses several
//! tabs into the publishable JSON bundle.

pub mod bundle;
pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod parse;

use anyhow::Result;
use error::HelpfulError;
use std::path::Path;
use timetable_core::{ParseError, ParseOutcome, TimetableParser};
use tracing::debug;

/// Read an exported tab as text.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    std::fs::read_to_string(path)
        .map_err(|err| HelpfulError::cannot_read_file(path, &err.to_string()).into())
}

/// Parser configured from the resolved config file, or defaults.
pub fn build_parser(config_flag: Option<&Path>) -> Result<TimetableParser> {
    let (parser_config, source) = config::resolve(config_flag).map_err(|err| {
        let path = config::config_path(config_flag).unwrap_or_default();
        HelpfulError::invalid_config(&path, &err.to_string())
    })?;
    match &source {
        Some(path) => debug!(config = %path.display(), "Loaded parser configuration"),
        None => debug!("Using default parser configuration"),
    }
    Ok(TimetableParser::new(parser_config)?)
}

/// Read and parse one tab.
pub fn parse_file(parser: &TimetableParser, path: &Path) -> Result<ParseOutcome> {
    let text = read_document(path)?;
    parser.parse_document(&text).map_err(|err| match err {
        ParseError::Csv(inner) => HelpfulError::csv_decode_error(path, &inner.to_string()).into(),
        other => other.into(),
    })
}
