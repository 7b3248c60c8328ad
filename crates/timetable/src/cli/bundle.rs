//! Bundle command - parse several tabs into one publishable JSON document
//!
//! ```json
//! {"generated_at": "2026-01-12T06:00:00Z", "tabs": [{"day": "Monday", "entries": [...]}]}
//! ```

use crate::cli::error::HelpfulError;
use crate::cli::output::emit_json;
use crate::cli::{build_parser, parse_file};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use timetable_core::ClassEntry;
use tracing::info;

#[derive(Debug)]
pub struct BundleArgs {
    /// `DAY=FILE` pairs, in output order.
    pub tabs: Vec<String>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabBundle {
    pub day: String,
    pub entries: Vec<ClassEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub generated_at: String,
    pub tabs: Vec<TabBundle>,
}

impl Bundle {
    pub fn new(generated_at: DateTime<Utc>, tabs: Vec<TabBundle>) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            tabs,
        }
    }
}

/// Split `Monday=monday.csv` into its day and path.
pub fn parse_tab_spec(spec: &str) -> std::result::Result<(String, PathBuf), HelpfulError> {
    let (day, file) = spec
        .split_once('=')
        .ok_or_else(|| HelpfulError::invalid_tab_spec(spec))?;
    let (day, file) = (day.trim(), file.trim());
    if day.is_empty() || file.is_empty() {
        return Err(HelpfulError::invalid_tab_spec(spec));
    }
    Ok((day.to_string(), PathBuf::from(file)))
}

pub fn run(args: BundleArgs) -> Result<()> {
    if args.tabs.is_empty() {
        return Err(HelpfulError::new("No tabs given")
            .with_suggestion("TRY: timetable bundle --tab Monday=monday.csv")
            .into());
    }
    let specs = args
        .tabs
        .iter()
        .map(|spec| parse_tab_spec(spec))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let parser = build_parser(args.config.as_deref())?;
    let mut tabs = Vec::with_capacity(specs.len());
    for (day, path) in specs {
        let outcome = parse_file(&parser, &path)?;
        info!(day = %day, file = %path.display(), entries = outcome.entries.len(), "Bundled tab");
        tabs.push(TabBundle {
            day,
            entries: outcome.entries,
        });
    }

    emit_json(&Bundle::new(Utc::now(), tabs), args.output.as_deref())
}
