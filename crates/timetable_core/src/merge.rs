//! Merge and dedup resolver
//!
//! Rules that split a cell can emit several near-identical entries for one
//! physical class. Entries sharing a display key (department, day, slot,
//! subject, course code) are folded into one record that lists every cohort
//! taking the class. Lab annotation runs on the folded list, then exact
//! duplicates under the full entry key are dropped.

use crate::allowed::AllowedIndex;
use crate::config::ParserConfig;
use crate::departments::{program_owner, same_department, sub_department};
use crate::extract::UNKNOWN_ROOM;
use crate::labs::annotate_labs;
use crate::programs::{extract_global_programs, is_program_metadata_segment};
use crate::text::norm_key;
use crate::types::{ClassEntry, Cohort, MergedProgram, ValidationEvent};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

static TBA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bTBA\b").unwrap());

type DisplayKey = (String, String, String, String, String);

fn display_key(e: &ClassEntry) -> DisplayKey {
    (
        e.department.clone(),
        e.day.clone(),
        e.time_slot.clone(),
        e.subject.clone(),
        e.course_code.clone(),
    )
}

/// Full identity of an entry, compared case- and whitespace-insensitively.
pub fn entry_key(e: &ClassEntry) -> [String; 10] {
    [
        &e.department,
        &e.sub_department,
        &e.program,
        &e.semester,
        &e.section,
        &e.subject,
        &e.course_code,
        &e.day,
        &e.time_slot,
        &e.room_name,
    ]
    .map(|s| norm_key(s))
}

fn best_teacher(group: &[ClassEntry]) -> Option<(&str, &str)> {
    let named = |e: &&ClassEntry| !e.teacher_name.trim().is_empty();
    group
        .iter()
        .filter(named)
        .find(|e| !e.teacher_sap_id.trim().is_empty())
        .or_else(|| group.iter().filter(named).find(|e| !TBA.is_match(&e.teacher_name)))
        .or_else(|| group.iter().find(named))
        .map(|e| (e.teacher_name.as_str(), e.teacher_sap_id.as_str()))
}

fn fold_group(
    group: Vec<ClassEntry>,
    index: &AllowedIndex,
    log: &mut Vec<ValidationEvent>,
) -> Option<ClassEntry> {
    let mut base = group.first()?.clone();

    if base.room_name == UNKNOWN_ROOM {
        if let Some(room) = group.iter().find(|e| e.room_name != UNKNOWN_ROOM) {
            base.room_name = room.room_name.clone();
        }
    }
    if let Some((name, id)) = best_teacher(&group) {
        base.teacher_name = name.to_string();
        base.teacher_sap_id = id.to_string();
    }

    let mut seen = HashSet::new();
    let cohorts: Vec<Cohort> = group
        .iter()
        .map(ClassEntry::cohort)
        .filter(|c| !c.is_empty())
        .chain(extract_global_programs(&base.raw_text))
        .filter(|c| seen.insert(c.clone()))
        .collect();

    let mut merged = Vec::with_capacity(cohorts.len());
    let mut departments = BTreeSet::new();
    let mut cross_department = false;
    for cohort in cohorts {
        let owner = program_owner(&cohort.program).unwrap_or("");
        let department = if owner.is_empty() { base.department.as_str() } else { owner };
        let label = index.validate(
            department,
            &sub_department(department, &cohort.program),
            &cohort.program,
            log,
        );
        if !owner.is_empty() {
            departments.insert(owner.to_string());
            cross_department |= !same_department(owner, &base.department);
        }
        merged.push(MergedProgram {
            program: cohort.program,
            semester: cohort.semester,
            section: cohort.section,
            department: owner.to_string(),
            sub_department: label,
        });
    }

    base.is_merged_class |= merged.len() >= 2;
    base.has_cross_department_merge |= cross_department;
    if !merged.is_empty() {
        base.merged_programs = merged;
        base.merged_departments = departments.into_iter().collect();
    }
    Some(base)
}

/// Fold, annotate and dedup the interpreter's raw entries.
pub fn resolve(
    raw: Vec<ClassEntry>,
    index: &AllowedIndex,
    config: &ParserConfig,
    log: &mut Vec<ValidationEvent>,
) -> Vec<ClassEntry> {
    let raw_count = raw.len();
    let mut groups: Vec<Vec<ClassEntry>> = Vec::new();
    let mut positions: HashMap<DisplayKey, usize> = HashMap::new();
    for entry in raw {
        let probe = if entry.raw_text.trim().is_empty() { &entry.subject } else { &entry.raw_text };
        if is_program_metadata_segment(probe, &entry.subject) {
            continue;
        }
        let pos = *positions.entry(display_key(&entry)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[pos].push(entry);
    }

    let mut folded: Vec<ClassEntry> = groups
        .into_iter()
        .filter_map(|group| fold_group(group, index, log))
        .collect();

    annotate_labs(&mut folded, config);

    let mut seen = HashSet::new();
    folded.retain(|e| seen.insert(entry_key(e)));

    debug!(raw = raw_count, resolved = folded.len(), "Resolved entries");
    folded
}
