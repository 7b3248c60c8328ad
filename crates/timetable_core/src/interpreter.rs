//! Cell interpreter
//!
//! Turns the text of one grid cell into zero or more class entries. The
//! interpretation is an ordered chain of rules; each rule either declines
//! (`None`) or claims the cell and returns its entries, possibly none.
//!
//! ```text
//! reserved                 "Reserved", "slot used", ...            -> nothing
//! time_range               "08:00-09:00" spilled from a header     -> nothing
//! metadata_only            "BSCS-3A, BSSE-3A"                      -> nothing
//! multi_program            "Calculus I BSCS-3A, BSSE-3A Dr. Uzma"  -> one per cohort
//! paren_teacher_groups     "OOP (Dr. Asad Ali), DB (Ms. Hina Khan)" -> one per group
//! titled_teacher_segments  "OOP Dr. Asad Ali DB Ms. Hina Khan"      -> one per teacher
//! code_groups              "OOP (CS 211) DB (CS 220)"              -> one per group
//! single_class             anything else                           -> exactly one
//! ```

use crate::config::ParserConfig;
use crate::departments::belongs_to;
use crate::extract::{resolve_room, subject_and_code, teacher_info, tidy_teacher_name};
use crate::grid::is_time_range_only;
use crate::patterns::program::first_program_match;
use crate::patterns::teacher::{PAREN_TEACHER_GROUP, TITLED_NAME};
use crate::patterns::is_reserved_cell;
use crate::programs::{
    assign_programs, extract_global_programs, infer_program_from_context, is_program_metadata_segment,
    semester_section_from_any,
};
use crate::text::{collapse_ws, fix_raw_typos, join_cell_lines};
use crate::types::{ClassEntry, Cohort, MergedProgram};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static TRAILING_JOINERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[,&/]+\s*$").unwrap());
static LEADING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*,\s*").unwrap());
static TRAILING_TEACHER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(?\s*(\d{4,6})\s*\)?").unwrap());
static CODE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^()]+?)\(([A-Za-z][^)]*?\d[^)]*?)\)").unwrap());
static DOTTED_BS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bB\.?S\b").unwrap());

/// Where a cell sits in the grid.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub department: &'a str,
    pub day: &'a str,
    pub time_slot: &'a str,
    /// First cell of the room row, trimmed.
    pub room_label: &'a str,
    pub room_capacity: &'a str,
    pub room_sap_id: &'a str,
    /// Whether `room_label` names a real room.
    pub header_valid: bool,
    pub config: &'a ParserConfig,
}

impl CellContext<'_> {
    /// Entry with every field given; the room is resolved from `raw_text`.
    fn entry(
        &self,
        raw_text: &str,
        (subject, course_code): (String, String),
        cohort: &Cohort,
        (teacher_name, teacher_sap_id): (String, String),
    ) -> ClassEntry {
        let room_name = resolve_room(
            self.room_label,
            self.header_valid,
            raw_text,
            self.department,
            &self.config.paren_room_departments,
        );
        ClassEntry {
            day: self.day.to_string(),
            department: self.department.to_string(),
            time_slot: self.time_slot.to_string(),
            room_name,
            room_capacity: self.room_capacity.to_string(),
            room_sap_id: self.room_sap_id.to_string(),
            subject,
            course_code,
            program: DOTTED_BS.replace_all(&cohort.program, "BS").trim().to_string(),
            semester: cohort.semester.clone(),
            section: cohort.section.clone(),
            teacher_name,
            teacher_sap_id,
            raw_text: raw_text.to_string(),
            ..ClassEntry::default()
        }
    }

    /// Entry whose subject, code and teacher are all read from `text`.
    fn whole_text_entry(&self, text: &str, cohort: &Cohort) -> ClassEntry {
        let teacher = teacher_info(text, &cohort.section);
        self.entry(text, subject_and_code(text), cohort, teacher)
    }
}

pub type Rule = fn(&str, &CellContext<'_>) -> Option<Vec<ClassEntry>>;

/// Interpretation rules in priority order.
pub const RULES: &[(&str, Rule)] = &[
    ("reserved", reserved),
    ("time_range", time_range),
    ("metadata_only", metadata_only),
    ("multi_program", multi_program),
    ("paren_teacher_groups", paren_teacher_groups),
    ("titled_teacher_segments", titled_teacher_segments),
    ("code_groups", code_groups),
    ("single_class", single_class),
];

/// Cell text as the rules see it: lines joined, known typos fixed.
pub fn normalize_cell(cell: &str) -> String {
    fix_raw_typos(&join_cell_lines(cell))
}

/// Run the rule chain over one cell. Returns the name of the rule that claimed it.
pub fn interpret(cell: &str, ctx: &CellContext<'_>) -> (&'static str, Vec<ClassEntry>) {
    let text = normalize_cell(cell);
    if text.is_empty() {
        return ("blank", Vec::new());
    }
    for (name, rule) in RULES {
        if let Some(entries) = rule(&text, ctx) {
            debug!(
                rule = *name,
                department = ctx.department,
                time_slot = ctx.time_slot,
                entries = entries.len(),
                "Interpreted cell"
            );
            return (*name, entries);
        }
    }
    ("single_class", Vec::new())
}

fn reserved(text: &str, _ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    is_reserved_cell(text).then(Vec::new)
}

fn time_range(text: &str, _ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    is_time_range_only(text).then(Vec::new)
}

fn metadata_only(text: &str, _ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    let (subject, _) = subject_and_code(text);
    is_program_metadata_segment(text, &subject).then(Vec::new)
}

/// Cohorts owned by the department, or all of them when none are.
fn preferred_cohorts(cohorts: &[Cohort], department: &str) -> Vec<Cohort> {
    let owned: Vec<Cohort> = cohorts
        .iter()
        .filter(|c| belongs_to(&c.program, department))
        .cloned()
        .collect();
    let chosen = if owned.is_empty() { cohorts.to_vec() } else { owned };
    let mut seen = HashSet::new();
    chosen.into_iter().filter(|c| seen.insert(c.clone())).collect()
}

fn merged_list(cohorts: &[Cohort]) -> Vec<MergedProgram> {
    cohorts
        .iter()
        .map(|c| MergedProgram {
            program: c.program.clone(),
            semester: c.semester.clone(),
            section: c.section.clone(),
            ..MergedProgram::default()
        })
        .collect()
}

fn multi_program(text: &str, ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    let cohorts = extract_global_programs(text);
    if cohorts.len() < 2 {
        return None;
    }
    let merged = merged_list(&cohorts);
    let entries = preferred_cohorts(&cohorts, ctx.department)
        .iter()
        .map(|cohort| {
            let mut entry = ctx.whole_text_entry(text, cohort);
            entry.is_merged_class = true;
            entry.merged_programs = merged.clone();
            entry
        })
        .collect();
    Some(entries)
}

fn paren_teacher_groups(text: &str, ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    let groups: Vec<_> = PAREN_TEACHER_GROUP.captures_iter(text).collect();
    if groups.len() < 2 {
        return None;
    }
    let program = infer_program_from_context(ctx.department, text);
    let mut entries: Vec<ClassEntry> = groups
        .iter()
        .filter_map(|caps| {
            let segment = TRAILING_JOINERS.replace(caps.get(1)?.as_str().trim(), "").into_owned();
            let teacher_raw = caps.get(2)?.as_str().trim();
            let (semester, section) = semester_section_from_any(&segment);
            let raw_text = format!("{segment} ({teacher_raw})");
            Some(ctx.entry(
                &raw_text,
                subject_and_code(&segment),
                &Cohort::new(program.as_str(), semester, section),
                (tidy_teacher_name(teacher_raw), String::new()),
            ))
        })
        .collect();
    assign_programs(&mut entries, text);
    Some(entries)
}

fn titled_teacher_segments(text: &str, ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    let names: Vec<_> = TITLED_NAME.find_iter(text).collect();
    if names.len() < 2 {
        return None;
    }
    let mut entries = Vec::new();
    let mut start = 0;
    for name in names {
        let mut end = name.end();
        let id = TRAILING_TEACHER_ID.captures(&text[end..]).and_then(|caps| {
            let id = caps.get(1)?.as_str().to_string();
            end += caps.get(0)?.end();
            Some(id)
        });
        let segment = LEADING_COMMA.replace(text[start..end].trim(), "").into_owned();
        start = end;

        let (subject, code) = subject_and_code(&segment);
        if is_program_metadata_segment(&segment, &subject) {
            continue;
        }
        let (semester, section) = semester_section_from_any(&segment);
        let cohort = Cohort::new(infer_program_from_context(ctx.department, &segment), semester, section);
        entries.push(ctx.entry(
            &segment,
            (subject, code),
            &cohort,
            (tidy_teacher_name(name.as_str()), id.unwrap_or_default()),
        ));
    }
    assign_programs(&mut entries, text);
    Some(entries)
}

/// Cohort for one segment: first catalogue hit, else context and loose semester phrasing.
fn segment_cohort(segment: &str, department: &str) -> Cohort {
    if let Some(found) = first_program_match(segment) {
        return found.cohort;
    }
    let (semester, section) = semester_section_from_any(segment);
    Cohort::new(infer_program_from_context(department, segment), semester, section)
}

fn code_groups(text: &str, ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    let groups: Vec<_> = CODE_GROUP.find_iter(text).collect();
    if groups.len() < 2 {
        return None;
    }
    let mut entries = Vec::new();
    for (idx, group) in groups.iter().enumerate() {
        let end = groups.get(idx + 1).map_or(text.len(), |next| next.start());
        let segment = LEADING_COMMA.replace(text[group.start()..end].trim(), "").into_owned();
        let (subject, _) = subject_and_code(&segment);
        if is_program_metadata_segment(&segment, &subject) {
            continue;
        }
        let cohorts = extract_global_programs(&segment);
        if cohorts.len() > 1 {
            entries.extend(cohorts.iter().map(|c| ctx.whole_text_entry(&segment, c)));
        } else {
            entries.push(ctx.whole_text_entry(&segment, &segment_cohort(&segment, ctx.department)));
        }
    }

    let titled: Vec<_> = TITLED_NAME.find_iter(text).collect();
    let backfill = match titled.as_slice() {
        [only] => Some(tidy_teacher_name(only.as_str())),
        [] if entries.len() >= 2 => {
            let (name, _) = teacher_info(text, "");
            (!name.is_empty()).then_some(name)
        }
        _ => None,
    };
    if let Some(name) = backfill {
        for entry in entries.iter_mut().filter(|e| e.teacher_name.is_empty()) {
            entry.teacher_name = name.clone();
        }
    }
    assign_programs(&mut entries, text);
    Some(entries)
}

fn single_class(text: &str, ctx: &CellContext<'_>) -> Option<Vec<ClassEntry>> {
    let (semester, section) = semester_section_from_any(text);
    let mut cohort = Cohort::new(infer_program_from_context(ctx.department, text), semester, section);

    let globals = extract_global_programs(text);
    let explicit = match globals.as_slice() {
        [] => first_program_match(text).map(|m| m.cohort),
        all => all
            .iter()
            .find(|c| c.program.starts_with("BS ") && c.program != "BS")
            .or_else(|| all.first())
            .cloned(),
    };
    if let Some(found) = explicit {
        if !found.program.is_empty() {
            cohort.program = found.program;
        }
        if !found.semester.is_empty() {
            cohort.semester = found.semester;
        }
        if !found.section.is_empty() {
            cohort.section = found.section;
        }
    }
    Some(vec![ctx.whole_text_entry(&collapse_ws(text), &cohort)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(department: &'a str, config: &'a ParserConfig) -> CellContext<'a> {
        CellContext {
            department,
            day: "Monday",
            time_slot: "09:00-10:00",
            room_label: "C-201",
            room_capacity: "",
            room_sap_id: "C-201",
            header_valid: true,
            config,
        }
    }

    fn run(cell: &str, department: &str) -> (&'static str, Vec<ClassEntry>) {
        let config = ParserConfig::default();
        interpret(cell, &ctx(department, &config))
    }

    #[test]
    fn test_single_clean_cell() {
        let (rule, entries) = run("Data Structures (CS 210) Dr. Ali Khan 10234", "CS & IT");
        assert_eq!(rule, "single_class");
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.subject, "Data Structures");
        assert_eq!(e.course_code, "CS 210");
        assert_eq!(e.teacher_name, "Dr. Ali Khan");
        assert_eq!(e.teacher_sap_id, "10234");
        assert_eq!(e.room_name, "C-201");
        assert_eq!(e.program, "");
        assert_eq!(e.time_slot, "09:00-10:00");
    }

    #[test]
    fn test_multi_program_cell() {
        let (rule, entries) = run("Calculus I BSCS-3A, BSSE-3A Dr. Uzma 14521", "CS & IT");
        assert_eq!(rule, "multi_program");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cohort(), Cohort::new("BSCS", "3", "A"));
        assert_eq!(entries[1].cohort(), Cohort::new("BSSE", "3", "A"));
        for e in &entries {
            assert!(e.is_merged_class);
            assert_eq!(e.subject, "Calculus I");
            assert_eq!(e.teacher_name, "Dr. Uzma");
            assert_eq!(e.teacher_sap_id, "14521");
            assert_eq!(e.merged_programs.len(), 2);
        }
    }

    #[test]
    fn test_multi_program_prefers_owned_cohorts() {
        let (_, entries) = run("Business Maths BBA-II, BSCS-1A Mr. Kamran", "CS & IT");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].program, "BSCS");
        assert_eq!(entries[0].merged_programs.len(), 2);
    }

    #[test]
    fn test_reserved_and_artifacts() {
        assert_eq!(run("Reserved", "CS & IT"), ("reserved", vec![]));
        assert_eq!(run("CS reserved\nslot used", "CS & IT").1, vec![]);
        assert_eq!(run("08:00 - 09:00", "CS & IT"), ("time_range", vec![]));
        assert_eq!(run("BSCS-3A, BSSE-3A", "CS & IT"), ("metadata_only", vec![]));
        assert_eq!(run("  \n ", "CS & IT"), ("blank", vec![]));
    }

    #[test]
    fn test_reserved_word_with_code_is_a_class() {
        let (rule, entries) = run("Reserved for CS 101 Intro", "CS & IT");
        assert_ne!(rule, "reserved");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_paren_teacher_groups() {
        let (rule, entries) = run("OOP (Dr. Asad Ali), Databases (Ms. Hina Khan)", "CS & IT");
        assert_eq!(rule, "paren_teacher_groups");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subject, "OOP");
        assert_eq!(entries[0].teacher_name, "Dr. Asad Ali");
        assert_eq!(entries[1].subject, "Databases");
        assert_eq!(entries[1].teacher_name, "Ms. Hina Khan");
    }

    #[test]
    fn test_titled_teacher_segments() {
        let (rule, entries) = run("Anatomy Dr. Sara Malik 12345 Physiology Dr. Omer Farooq 54321", "DPT");
        assert_eq!(rule, "titled_teacher_segments");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subject, "Anatomy");
        assert_eq!(entries[0].teacher_sap_id, "12345");
        assert_eq!(entries[1].subject, "Physiology");
        assert_eq!(entries[1].teacher_name, "Dr. Omer Farooq");
        assert!(entries.iter().all(|e| e.program == "DPT"));
    }

    #[test]
    fn test_code_groups_backfill_teacher() {
        let (rule, entries) = run("OOP (CS 211), DB (CS 220) Dr. Asad", "CS & IT");
        assert_eq!(rule, "code_groups");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].course_code, "CS 211");
        assert_eq!(entries[1].course_code, "CS 220");
        assert!(entries.iter().all(|e| e.teacher_name == "Dr. Asad"));
    }

    #[test]
    fn test_inline_room_when_header_is_blank() {
        let config = ParserConfig::default();
        let mut c = ctx("ISLAMIC STUDY", &config);
        c.room_label = "";
        c.header_valid = false;
        let (_, entries) = interpret("Tafseer Room # 12 Mufti Ahmed", &c);
        assert_eq!(entries[0].room_name, "Room 12");
        assert_eq!(entries[0].subject, "Tafseer");
    }

    #[test]
    fn test_context_program() {
        let (_, entries) = run("Pharmacology Semester III Dr. Nida", "PHARM-D");
        assert_eq!(entries[0].program, "PharmD");
        assert_eq!(entries[0].semester, "3");
    }
}
