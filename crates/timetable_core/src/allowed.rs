//! Allowed index
//!
//! A per-document record of which sub-department labels each department's
//! own cells attest. Inferred labels are checked against it so that a
//! fallback like "Physics General" is not invented for a department whose
//! cells only ever mention specific programs.

use crate::departments::{belongs_to, is_general_label, normalize_department_name, sub_department};
use crate::grid::Block;
use crate::programs::extract_global_programs;
use crate::text::{join_cell_lines, norm_key};
use crate::types::{AllowedIndexReport, RejectionReason, ValidationEvent};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

static GENERAL_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bgeneral\b").unwrap());

fn department_key(department: &str) -> String {
    norm_key(&normalize_department_name(department))
}

#[derive(Debug, Clone, Default)]
pub struct AllowedIndex {
    departments: BTreeSet<String>,
    labels: BTreeMap<String, BTreeSet<String>>,
    normalized: HashMap<String, HashSet<String>>,
}

impl AllowedIndex {
    /// Scan every room-row cell of every block.
    pub fn build(blocks: &[Block]) -> Self {
        let mut index = Self::default();
        for block in blocks {
            index.departments.insert(block.department.clone());
            for row in &block.rows {
                for cell in &row.cells {
                    let text = join_cell_lines(cell);
                    if !text.is_empty() {
                        index.observe(&block.department, &text);
                    }
                }
            }
        }
        debug!(
            departments = index.departments.len(),
            attested = index.labels.values().map(BTreeSet::len).sum::<usize>(),
            "Built allowed index"
        );
        index
    }

    fn observe(&mut self, department: &str, text: &str) {
        let mentions_general = GENERAL_WORD.is_match(text);
        let cohorts = extract_global_programs(text);
        if cohorts.is_empty() {
            if mentions_general {
                let fallback = sub_department(department, "");
                if is_general_label(&fallback) {
                    self.attest(department, fallback);
                }
            }
            return;
        }
        for cohort in cohorts {
            if !belongs_to(&cohort.program, department) {
                continue;
            }
            let label = sub_department(department, &cohort.program);
            if label.is_empty() || (is_general_label(&label) && !mentions_general) {
                continue;
            }
            self.attest(department, label);
        }
    }

    fn attest(&mut self, department: &str, label: String) {
        self.normalized
            .entry(department_key(department))
            .or_default()
            .insert(norm_key(&label));
        self.labels.entry(department.to_string()).or_default().insert(label);
    }

    fn attested(&self, department: &str) -> Option<&HashSet<String>> {
        self.normalized
            .get(&department_key(department))
            .filter(|set| !set.is_empty())
    }

    /// Keep `label` if the document supports it, otherwise log and clear it.
    ///
    /// A department with no attested labels keeps its inferred label only for
    /// entries without a program or with a program it owns.
    pub fn validate(
        &self,
        department: &str,
        label: &str,
        program: &str,
        log: &mut Vec<ValidationEvent>,
    ) -> String {
        if label.is_empty() {
            return String::new();
        }
        let key = norm_key(label);
        let reason = match self.attested(department) {
            Some(set) if set.contains(&key) => None,
            Some(_) if is_general_label(label) => Some(RejectionReason::GeneralNotAttested),
            Some(_) => Some(RejectionReason::NotInDocument),
            None if belongs_to(program, department) => None,
            None => Some(RejectionReason::ForeignProgram),
        };
        match reason {
            None => label.to_string(),
            Some(reason) => {
                debug!(department, sub_department = label, program, %reason, "Rejected sub-department");
                log.push(ValidationEvent {
                    department: department.to_string(),
                    program: program.to_string(),
                    sub_department: label.to_string(),
                    reason,
                });
                String::new()
            }
        }
    }

    pub fn report(&self) -> AllowedIndexReport {
        AllowedIndexReport {
            departments: self.departments.clone(),
            subdepartments: self.labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RoomRow;

    fn block(department: &str, cells: &[&str]) -> Block {
        Block {
            department: department.to_string(),
            day: "Monday".to_string(),
            time_slots: vec!["08:00-09:00".to_string(); cells.len()],
            rows: vec![RoomRow {
                index: 2,
                label: "C-201".to_string(),
                cells: cells.iter().map(|c| c.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn test_attests_owned_programs_only() {
        let index = AllowedIndex::build(&[block("CS & IT", &["OOP BSCS-3A", "Marketing BBA-II"])]);
        let report = index.report();
        assert_eq!(
            report.subdepartments["CS & IT"].iter().collect::<Vec<_>>(),
            vec!["Computer Science"]
        );
        assert!(report.departments.contains("CS & IT"));
    }

    #[test]
    fn test_general_needs_the_word() {
        let index = AllowedIndex::build(&[block("CS & IT", &["Ethics", "Seminar (General)"])]);
        let report = index.report();
        assert_eq!(
            report.subdepartments["CS & IT"].iter().collect::<Vec<_>>(),
            vec!["CS & IT General"]
        );
    }

    #[test]
    fn test_validate_rejects_unattested_general() {
        let index = AllowedIndex::build(&[block("CS & IT", &["OOP BSCS-3A"])]);
        let mut log = Vec::new();
        assert_eq!(index.validate("CS & IT", "CS & IT General", "", &mut log), "");
        assert_eq!(log[0].reason, RejectionReason::GeneralNotAttested);
        assert_eq!(index.validate("cs and it", "Computer Science", "BSCS", &mut log), "Computer Science");
        assert_eq!(index.validate("CS & IT", "Software Engineering", "BSSE", &mut log), "");
        assert_eq!(log[1].reason, RejectionReason::NotInDocument);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_validate_keeps_labels_without_evidence() {
        let index = AllowedIndex::build(&[block("CS & IT", &["Data Structures (CS 210) Dr. Ali Khan 10234"])]);
        let mut log = Vec::new();
        assert_eq!(index.validate("CS & IT", "CS & IT General", "", &mut log), "CS & IT General");
        assert!(log.is_empty());
        assert!(index.report().subdepartments.is_empty());
    }

    #[test]
    fn test_validate_rejects_foreign_program_without_evidence() {
        let index = AllowedIndex::build(&[block("CS & IT", &["Ethics Mr. Ali"])]);
        let mut log = Vec::new();
        assert_eq!(index.validate("CS & IT", "CS & IT General", "BSAF2Y", &mut log), "");
        assert_eq!(index.validate("CS & IT", "CS & IT General", "BBA", &mut log), "");
        assert_eq!(index.validate("CS & IT", "Computer Science", "BSCS", &mut log), "Computer Science");
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.reason == RejectionReason::ForeignProgram));
        assert_eq!(log[0].program, "BSAF2Y");
    }
}
