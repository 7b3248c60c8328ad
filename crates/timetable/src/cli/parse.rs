//! Parse command - extract class entries from one exported tab

use crate::cli::output::{emit_json, or_dash, print_table, truncate};
use crate::cli::{build_parser, parse_file};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use timetable_core::{ClassEntry, ParseOutcome, ValidationEvent};
use tracing::info;

#[derive(Debug)]
pub struct ParseArgs {
    pub file: PathBuf,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub validation: bool,
    pub config: Option<PathBuf>,
}

/// JSON shape when the validation log is requested.
#[derive(Serialize)]
struct WithValidation<'a> {
    entries: &'a [ClassEntry],
    validation_log: &'a [ValidationEvent],
}

pub fn run(args: ParseArgs) -> Result<()> {
    let parser = build_parser(args.config.as_deref())?;
    let outcome = parse_file(&parser, &args.file)?;
    info!(file = %args.file.display(), entries = outcome.entries.len(), "Parsed tab");

    if args.json || args.output.is_some() {
        let output = args.output.as_deref();
        return if args.validation {
            emit_json(
                &WithValidation {
                    entries: &outcome.entries,
                    validation_log: &outcome.validation_log,
                },
                output,
            )
        } else {
            emit_json(&outcome.entries, output)
        };
    }

    print_entries(&outcome.entries);
    if args.validation {
        print_validation(&outcome.validation_log);
    }
    println!("{}", summary_line(&outcome));
    Ok(())
}

fn cohort_label(entry: &ClassEntry) -> String {
    let mut label = entry.program.clone();
    if !entry.semester.is_empty() {
        label.push_str(&format!(" {}{}", entry.semester, entry.section));
    }
    let extra = entry.merged_programs.len().saturating_sub(1);
    if entry.is_merged_class && extra > 0 {
        label.push_str(&format!(" (+{extra})"));
    }
    label.trim().to_string()
}

fn print_entries(entries: &[ClassEntry]) {
    if entries.is_empty() {
        println!("No class entries found.");
        return;
    }
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.day.clone(),
                e.time_slot.clone(),
                truncate(&e.room_name),
                truncate(&e.subject),
                or_dash(&e.course_code),
                or_dash(&cohort_label(e)),
                or_dash(&truncate(&e.teacher_name)),
            ]
        })
        .collect();
    print_table(&["DAY", "SLOT", "ROOM", "SUBJECT", "CODE", "PROGRAM", "TEACHER"], rows);
}

fn print_validation(log: &[ValidationEvent]) {
    if log.is_empty() {
        println!("No sub-department rejections.");
        return;
    }
    let rows = log
        .iter()
        .map(|event| {
            vec![
                event.department.clone(),
                or_dash(&event.program),
                event.sub_department.clone(),
                event.reason.to_string(),
            ]
        })
        .collect();
    print_table(&["DEPARTMENT", "PROGRAM", "SUB-DEPARTMENT", "REASON"], rows);
}

pub fn summary_line(outcome: &ParseOutcome) -> String {
    let merged = outcome.entries.iter().filter(|e| e.is_merged_class).count();
    let labs = outcome.entries.iter().filter(|e| e.is_lab_session).count();
    format!(
        "{} entries from {} cells in {} blocks ({} merged, {} lab slots, {} rejected sub-departments)",
        outcome.stats.entries,
        outcome.stats.cells,
        outcome.stats.blocks,
        merged,
        labs,
        outcome.validation_log.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_core::MergedProgram;

    #[test]
    fn test_cohort_label() {
        let mut entry = ClassEntry {
            program: "BSCS".into(),
            semester: "3".into(),
            section: "A".into(),
            ..ClassEntry::default()
        };
        assert_eq!(cohort_label(&entry), "BSCS 3A");
        entry.is_merged_class = true;
        entry.merged_programs = vec![MergedProgram::default(), MergedProgram::default()];
        assert_eq!(cohort_label(&entry), "BSCS 3A (+1)");
        assert_eq!(cohort_label(&ClassEntry::default()), "");
    }

    #[test]
    fn test_summary_line() {
        let outcome = ParseOutcome::default();
        assert_eq!(
            summary_line(&outcome),
            "0 entries from 0 cells in 0 blocks (0 merged, 0 lab slots, 0 rejected sub-departments)"
        );
    }
}
