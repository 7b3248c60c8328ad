//! Records produced by the engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn is_false(value: &bool) -> bool {
    !*value
}

/// A (program, semester, section) triple recovered from cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cohort {
    pub program: String,
    pub semester: String,
    pub section: String,
}

impl Cohort {
    pub fn new(
        program: impl Into<String>,
        semester: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            semester: semester.into(),
            section: section.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty() && self.semester.is_empty() && self.section.is_empty()
    }
}

/// One cohort folded into a merged class record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedProgram {
    pub program: String,
    pub semester: String,
    pub section: String,
    pub department: String,
    pub sub_department: String,
}

/// One class taking place in one room during one time slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub day: String,
    pub department: String,
    pub sub_department: String,
    pub time_slot: String,
    pub room_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub room_capacity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub room_sap_id: String,
    pub subject: String,
    pub course_code: String,
    pub program: String,
    pub semester: String,
    pub section: String,
    pub teacher_name: String,
    pub teacher_sap_id: String,
    pub raw_text: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_lab_session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lab_span_slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_span_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_span_is_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_annotation_source: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_merged_class: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_programs: Vec<MergedProgram>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_departments: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_cross_department_merge: bool,
}

impl ClassEntry {
    pub fn cohort(&self) -> Cohort {
        Cohort::new(&self.program, &self.semester, &self.section)
    }

    pub fn set_cohort(&mut self, cohort: &Cohort) {
        self.program = cohort.program.clone();
        self.semester = cohort.semester.clone();
        self.section = cohort.section.clone();
    }
}

/// Diagnostic view of the allowed index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedIndexReport {
    pub departments: BTreeSet<String>,
    pub subdepartments: BTreeMap<String, BTreeSet<String>>,
}

/// Why an inferred sub-department was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    GeneralNotAttested,
    NotInDocument,
    ForeignProgram,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::GeneralNotAttested => write!(f, "general_not_attested"),
            RejectionReason::NotInDocument => write!(f, "not_in_document"),
            RejectionReason::ForeignProgram => write!(f, "foreign_program"),
        }
    }
}

/// A sub-department rejected by the allowed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEvent {
    pub department: String,
    pub program: String,
    pub sub_department: String,
    pub reason: RejectionReason,
}

/// Counters collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub rows: usize,
    pub blocks: usize,
    pub cells: usize,
    pub entries_before_merge: usize,
    pub entries: usize,
    pub rule_hits: BTreeMap<String, usize>,
}

/// Everything one parse call produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub entries: Vec<ClassEntry>,
    pub validation_log: Vec<ValidationEvent>,
    pub stats: ParseStats,
}
