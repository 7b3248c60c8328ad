//! Timetable extraction engine
//!
//! Reads the CSV export of a university timetable spreadsheet and recovers
//! structured class records from it. The export keeps no merged-cell
//! information, so structure is rebuilt from row shape and cell text:
//!
//! ```text
//! CSV text
//!   -> grid::decode / grid::segment       department blocks of room rows
//!   -> allowed::AllowedIndex::build       sub-departments the document attests
//!   -> interpreter::interpret             cell text -> raw entries
//!   -> merge::resolve                     fold cohorts, annotate labs, dedup
//!   -> Vec<ClassEntry>
//! ```
//!
//! The engine is a pure function of its input: no I/O, no shared state
//! between calls.

pub mod allowed;
pub mod config;
pub mod departments;
pub mod error;
pub mod extract;
pub mod grid;
pub mod interpreter;
pub mod labs;
pub mod merge;
pub mod patterns;
pub mod programs;
pub mod text;
pub mod types;

pub use allowed::AllowedIndex;
pub use config::ParserConfig;
pub use error::{ParseError, Result};
pub use types::{
    AllowedIndexReport, ClassEntry, Cohort, MergedProgram, ParseOutcome, ParseStats, RejectionReason,
    ValidationEvent,
};

use departments::sub_department;
use interpreter::{interpret, CellContext};
use patterns::room::{capacity_of, is_valid_room_header, sap_room_id_of};
use tracing::info;

/// Parser with a fixed configuration. Holds no per-document state.
#[derive(Debug, Clone, Default)]
pub struct TimetableParser {
    config: ParserConfig,
}

impl TimetableParser {
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one document (one spreadsheet tab).
    pub fn parse_document(&self, text: &str) -> Result<ParseOutcome> {
        let grid = grid::decode(text)?;
        let segmentation = grid::segment(&grid);
        let index = AllowedIndex::build(&segmentation.blocks);

        let mut stats = ParseStats {
            rows: grid.len(),
            blocks: segmentation.blocks.len(),
            ..ParseStats::default()
        };
        let mut validation_log = Vec::new();
        let mut raw = Vec::new();

        for block in &segmentation.blocks {
            for row in &block.rows {
                let room_capacity = capacity_of(&row.label);
                let room_sap_id = sap_room_id_of(&row.label);
                let header_valid = is_valid_room_header(&row.label);
                for (time_slot, cell) in block.slot_cells(row) {
                    if cell.trim().is_empty() {
                        continue;
                    }
                    stats.cells += 1;
                    let ctx = CellContext {
                        department: &block.department,
                        day: &block.day,
                        time_slot,
                        room_label: &row.label,
                        room_capacity: &room_capacity,
                        room_sap_id: &room_sap_id,
                        header_valid,
                        config: &self.config,
                    };
                    let (rule, entries) = interpret(cell, &ctx);
                    *stats.rule_hits.entry(rule.to_string()).or_default() += 1;
                    raw.extend(entries);
                }
            }
        }

        for entry in &mut raw {
            let label = sub_department(&entry.department, &entry.program);
            entry.sub_department =
                index.validate(&entry.department, &label, &entry.program, &mut validation_log);
        }

        stats.entries_before_merge = raw.len();
        let entries = merge::resolve(raw, &index, &self.config, &mut validation_log);
        stats.entries = entries.len();

        info!(
            blocks = stats.blocks,
            cells = stats.cells,
            entries = stats.entries,
            rejected = validation_log.len(),
            "Parsed timetable document"
        );

        Ok(ParseOutcome {
            entries,
            validation_log,
            stats,
        })
    }
}

/// Parse a document with the default configuration.
pub fn parse(text: &str) -> Result<Vec<ClassEntry>> {
    Ok(TimetableParser::default().parse_document(text)?.entries)
}

/// Departments and attested sub-departments of a document, without extracting entries.
pub fn build_allowed_index(text: &str) -> Result<AllowedIndexReport> {
    let grid = grid::decode(text)?;
    let segmentation = grid::segment(&grid);
    Ok(AllowedIndex::build(&segmentation.blocks).report())
}
