//! End-to-end parsing of whole timetable documents.

use std::collections::HashSet;
use timetable_core::departments::{program_owner, same_department};
use timetable_core::merge::entry_key;
use timetable_core::text::slots_consecutive;
use timetable_core::{
    build_allowed_index, parse, ParseError, ParserConfig, RejectionReason, TimetableParser,
};

const SLOTS: &str = ",08:00-09:00,09:00-10:00,10:00-11:00,11:00-12:00";

fn sheet(header: &str, rows: &[&str]) -> String {
    let mut doc = format!("{header},,,,\n{SLOTS}\n");
    for row in rows {
        doc.push_str(row);
        doc.push('\n');
    }
    doc
}

fn mixed_document() -> String {
    let mut doc = sheet(
        "CS & IT - Monday",
        &[
            "Room/Labs,,,,",
            r#"C-201,,"Data Structures (CS 210) Dr. Ali Khan 10234",,"#,
            r#"C-202,"Calculus I BSCS-3A, BSSE-3A Dr. Uzma 14521",,"Business Maths BBA-II, BSCS-1A Mr. Kamran","#,
            r#"Lab 2,"OOP Lab (CS 211L) Mr. Tariq","OOP Lab (CS 211L) Mr. Tariq","OOP Lab (CS 211L) Mr. Tariq",Reserved"#,
        ],
    );
    doc.push_str(&sheet(
        "Mathematics - Monday",
        &[r#"M-101,"Real Analysis BS Mathematics IV Dr. Saima",,RESERVED,"#],
    ));
    doc
}

#[test]
fn test_single_clean_cell() {
    let doc = sheet("CS & IT - Monday", &[r#"C-201,,"Data Structures (CS 210) Dr. Ali Khan 10234",,"#]);
    let entries = parse(&doc).unwrap();
    assert_eq!(entries.len(), 1);
    let e = &entries[0];
    assert_eq!(e.department, "CS & IT");
    assert_eq!(e.day, "Monday");
    assert_eq!(e.time_slot, "09:00-10:00");
    assert_eq!(e.room_name, "C-201");
    assert_eq!(e.room_sap_id, "C-201");
    assert_eq!(e.subject, "Data Structures");
    assert_eq!(e.course_code, "CS 210");
    assert_eq!(e.teacher_name, "Dr. Ali Khan");
    assert_eq!(e.teacher_sap_id, "10234");
    assert_eq!(e.sub_department, "CS & IT General");
    assert!(!e.is_merged_class);
}

#[test]
fn test_multi_program_cell_folds_into_merged_record() {
    let doc = sheet("CS & IT - Monday", &[r#"C-202,"Calculus I BSCS-3A, BSSE-3A Dr. Uzma 14521",,,"#]);
    let entries = parse(&doc).unwrap();
    assert_eq!(entries.len(), 1);
    let e = &entries[0];
    assert!(e.is_merged_class);
    assert_eq!(e.subject, "Calculus I");
    assert_eq!(e.teacher_name, "Dr. Uzma");
    assert_eq!(e.sub_department, "Computer Science");
    let cohorts: Vec<_> = e
        .merged_programs
        .iter()
        .map(|m| (m.program.as_str(), m.semester.as_str(), m.section.as_str()))
        .collect();
    assert_eq!(cohorts, vec![("BSCS", "3", "A"), ("BSSE", "3", "A")]);
    assert_eq!(e.merged_departments, vec!["CS & IT"]);
    assert!(!e.has_cross_department_merge);
}

#[test]
fn test_three_slot_lab() {
    let cell = r#""OOP Lab (CS 211L) Mr. Tariq""#;
    let row = format!("Lab 2,{cell},{cell},{cell},");
    let doc = sheet("CS & IT - Tuesday", &[&row]);
    let entries = parse(&doc).unwrap();
    assert_eq!(entries.len(), 3);
    let gid = entries[0].lab_span_group_id.clone();
    assert!(gid.is_some());
    for e in &entries {
        assert!(e.is_lab_session);
        assert_eq!(e.lab_duration.as_deref(), Some("3_hours"));
        assert_eq!(e.lab_span_group_id, gid);
        assert_eq!(e.lab_span_slots, vec!["08:00-09:00", "09:00-10:00", "10:00-11:00"]);
        assert_eq!(e.lab_annotation_source.as_deref(), Some("auto:lab-detection/v1"));
    }
    let starts = entries.iter().filter(|e| e.lab_span_is_start == Some(true)).count();
    assert_eq!(starts, 1);
}

#[test]
fn test_empty_sheet() {
    let doc = format!("CS & IT - Monday,,,,\n{SLOTS}\n");
    assert!(parse(&doc).unwrap().is_empty());
    assert!(parse("").unwrap().is_empty());
}

#[test]
fn test_reserved_cells_suppressed() {
    let doc = sheet("CS & IT - Monday", &["C-201,Reserved,reserved,RESERVED,"]);
    assert!(parse(&doc).unwrap().is_empty());

    for e in parse(&mixed_document()).unwrap() {
        assert!(!e.raw_text.eq_ignore_ascii_case("reserved"));
    }
}

#[test]
fn test_department_header_anchor() {
    let doc = sheet("Mathematics - Monday", &[r#"M-101,"Real Analysis BS Mathematics IV Dr. Saima",,,"#]);
    let entries = parse(&doc).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].department, "Mathematics");
    assert_eq!(entries[0].day, "Monday");
    assert_eq!(entries[0].room_name, "M-101");

    let report = build_allowed_index(&doc).unwrap();
    assert!(report.departments.contains("Mathematics"));
    assert_eq!(report.departments.len(), 1);
}

#[test]
fn test_parse_is_idempotent() {
    let doc = mixed_document();
    let first = serde_json::to_string(&parse(&doc).unwrap()).unwrap();
    let second = serde_json::to_string(&parse(&doc).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_duplicate_entry_keys() {
    let entries = parse(&mixed_document()).unwrap();
    assert!(!entries.is_empty());
    let keys: HashSet<_> = entries.iter().map(entry_key).collect();
    assert_eq!(keys.len(), entries.len());
}

#[test]
fn test_cross_department_merges_are_flagged() {
    let entries = parse(&mixed_document()).unwrap();
    let mut checked = 0;
    for e in entries.iter().filter(|e| e.is_merged_class) {
        let foreign = e
            .merged_programs
            .iter()
            .filter_map(|m| program_owner(&m.program))
            .any(|owner| !same_department(owner, &e.department));
        if foreign {
            assert!(e.has_cross_department_merge, "{e:?}");
            checked += 1;
        }
    }
    assert!(checked >= 1);
}

#[test]
fn test_lab_spans_are_contiguous() {
    let entries = parse(&mixed_document()).unwrap();
    let labs: Vec<_> = entries.iter().filter(|e| e.lab_span_slots.len() >= 2).collect();
    assert!(!labs.is_empty());
    for e in labs {
        assert!(e.is_lab_session);
        for pair in e.lab_span_slots.windows(2) {
            assert!(slots_consecutive(&pair[0], &pair[1]), "{:?}", e.lab_span_slots);
        }
    }
}

#[test]
fn test_allowed_index_report() {
    let report = build_allowed_index(&mixed_document()).unwrap();
    let departments: Vec<_> = report.departments.iter().map(String::as_str).collect();
    assert_eq!(departments, vec!["CS & IT", "Mathematics"]);
    let cs = &report.subdepartments["CS & IT"];
    assert!(cs.contains("Computer Science"));
    assert!(cs.contains("Software Engineering"));
}

#[test]
fn test_outcome_stats_and_config() {
    let parser = TimetableParser::new(ParserConfig {
        lab_departments: vec![],
        ..ParserConfig::default()
    })
    .unwrap();
    let outcome = parser.parse_document(&mixed_document()).unwrap();
    assert_eq!(outcome.stats.blocks, 2);
    assert_eq!(outcome.stats.rule_hits.get("reserved"), Some(&2));
    assert!(outcome.stats.entries_before_merge >= outcome.stats.entries);
    assert!(outcome.entries.iter().all(|e| !e.is_lab_session));

    let bad = ParserConfig {
        keyword_lab_hours: 0,
        ..ParserConfig::default()
    };
    assert!(matches!(TimetableParser::new(bad), Err(ParseError::Config(_))));
}


#[test]
fn test_block_without_slot_header_is_skipped() {
    let mut doc = String::from("Physics - Monday,,,,\nP-1,Optics,,,\n");
    doc.push_str(&sheet(
        "CS & IT - Monday",
        &[r#"C-201,,"Data Structures (CS 210) Dr. Ali Khan 10234",,"#],
    ));
    let entries = parse(&doc).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].department, "CS & IT");
    assert_eq!(entries[0].subject, "Data Structures");
    assert!(entries.iter().all(|e| e.subject != "Optics"));

    let report = build_allowed_index(&doc).unwrap();
    assert!(!report.subdepartments.contains_key("Physics"));
}

#[test]
fn test_foreign_programs_get_no_host_label() {
    let doc = sheet(
        "CS & IT - Monday",
        &[r#"C-201,"Accounting BSAF 2Y(I) Mr. Imran Khan 12345","Marketing BBA-II Mr. Kamran","Ethics Mr. Ali","#],
    );
    let outcome = TimetableParser::default().parse_document(&doc).unwrap();

    assert_eq!(outcome.entries.len(), 3);
    let by_program = |program: &str| {
        outcome
            .entries
            .iter()
            .find(|e| e.program == program)
            .unwrap_or_else(|| panic!("no {program:?} entry in {:?}", outcome.entries))
    };
    assert_eq!(by_program("BSAF2Y").sub_department, "");
    assert_eq!(by_program("BBA").sub_department, "");
    assert_eq!(by_program("").sub_department, "CS & IT General");

    for program in ["BSAF2Y", "BBA"] {
        let event = outcome
            .validation_log
            .iter()
            .find(|e| e.program == program)
            .unwrap_or_else(|| panic!("no rejection for {program}: {:?}", outcome.validation_log));
        assert_eq!(event.department, "CS & IT");
        assert_eq!(event.sub_department, "CS & IT General");
        assert_eq!(event.reason, RejectionReason::ForeignProgram);
    }
    assert!(outcome.validation_log.iter().all(|e| !e.program.is_empty()));
}

#[test]
fn test_lowercase_class_code_keeps_semester_and_section() {
    let doc = sheet("CS & IT - Monday", &["C-201,Ethics bscs-3a Mr. Ali,,,"]);
    let entries = parse(&doc).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].program, "BSCS");
    assert_eq!(entries[0].semester, "3");
    assert_eq!(entries[0].section, "A");
}
