//! Index command - show departments and the sub-departments a tab attests

use crate::cli::output::{emit_json, print_table};
use crate::cli::error::HelpfulError;
use crate::cli::read_document;
use anyhow::Result;
use std::path::PathBuf;
use timetable_core::{build_allowed_index, AllowedIndexReport, ParseError};

#[derive(Debug)]
pub struct IndexArgs {
    pub file: PathBuf,
    pub json: bool,
}

pub fn run(args: IndexArgs) -> Result<()> {
    let text = read_document(&args.file)?;
    let report = build_allowed_index(&text).map_err(|err| match err {
        ParseError::Csv(inner) => HelpfulError::csv_decode_error(&args.file, &inner.to_string()).into(),
        other => anyhow::Error::from(other),
    })?;

    if args.json {
        return emit_json(&report, None);
    }
    if report.departments.is_empty() {
        println!("No department headers found.");
        return Ok(());
    }
    print_table(&["DEPARTMENT", "ATTESTED SUB-DEPARTMENTS"], rows(&report));
    Ok(())
}

fn rows(report: &AllowedIndexReport) -> Vec<Vec<String>> {
    report
        .departments
        .iter()
        .map(|department| {
            let labels = report
                .subdepartments
                .get(department)
                .map(|set| set.iter().cloned().collect::<Vec<_>>().join(", "))
                .filter(|joined| !joined.is_empty())
                .unwrap_or_else(|| "(none; all inferred labels accepted)".to_string());
            vec![department.clone(), labels]
        })
        .collect()
}
