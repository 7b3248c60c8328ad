//! Global program extraction
//!
//! Finds every (program, semester, section) cohort mentioned anywhere in a
//! span of cell text, independent of how the cell is later split. Passes run
//! in a fixed order and their hits are merged, so earlier passes decide the
//! order of the result.

use crate::patterns::program::{
    canonical_program, canonical_spec, is_ignored_spec, is_recognised_spec, program_matches,
};
use crate::patterns::TITLE_TOKENS;
use crate::text::{collapse_ws, semester_number};
use crate::types::{ClassEntry, Cohort};
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Programs that count as anchored even when no semester follows them.
const SEMESTERLESS_ANCHORS: &[&str] = &[
    "BSCS", "BSSE", "BSAI", "BSMDS", "BBA2Y", "BBA", "BSAF2Y", "BSAF", "BSDM", "BSFT", "RIT", "HND",
    "MLT",
];

/// Prefixes accepted in the "<X> BS <sem>" form.
const ALLIED_PREFIXES: &[&str] = &["RIT", "HND", "IR", "MLT"];

struct FreeTextPatterns {
    sem_then_spec: Regex,
    paren_sem_then_spec: Regex,
    spec_then_sem: Regex,
    spec_then_paren_sem: Regex,
    spec_dash_sem: Regex,
    spec_paren_list: Regex,
    semester_token: Regex,
    prefix_bs_sem: Regex,
    prefix_bs_paren_sem: Regex,
    bs_sem_siss: Regex,
    b_ed: Regex,
    anchor: Regex,
    anchor_tail: Regex,
    allied_list: Regex,
    allied_name: Regex,
    allied_sem: Regex,
    two_year_paren: Regex,
    two_year_dash: Regex,
    two_year_bare: Regex,
    bs_sem_code: Regex,
    bs_sem_list: Regex,
    roman_or_digits: Regex,
}

static FREE_TEXT: LazyLock<FreeTextPatterns> = LazyLock::new(|| FreeTextPatterns {
    sem_then_spec: Regex::new(r"\bBS\s+([IVX]+|\d+)\s+([A-Za-z][A-Za-z&.\s]+?)(?:,|/|\)|$)").unwrap(),
    paren_sem_then_spec: Regex::new(
        r"\bBS\s*\(\s*([IVX]+|\d+)\s*\)\s+([A-Za-z][A-Za-z&.\s]+?)(?:,|/|\)|$)",
    )
    .unwrap(),
    spec_then_sem: Regex::new(r"\bBS\s+([A-Za-z][A-Za-z&.\s]+?)\s+([IVX]+|\d+)\b").unwrap(),
    spec_then_paren_sem: Regex::new(r"\bBS\s+([A-Za-z][A-Za-z&.\s]+?)\s*\(\s*([IVX]+|\d+)\s*\)")
        .unwrap(),
    spec_dash_sem: Regex::new(r"\bBS\s+([A-Za-z][A-Za-z&.\s]+?)\s*[-/]\s*([IVX]+|\d+)\b").unwrap(),
    spec_paren_list: Regex::new(r"\bBS\s+([A-Za-z][A-Za-z&.\s]+?)\s*\(([^)]*)\)").unwrap(),
    semester_token: Regex::new(r"(?i)\b([IVX]+|\d+(?:st|nd|rd|th)?)\b").unwrap(),
    prefix_bs_sem: Regex::new(r"\b([A-Za-z]{2,}[A-Za-z&.\s]*)\s+BS\s+([IVX]+|\d{1,2})\b").unwrap(),
    prefix_bs_paren_sem: Regex::new(
        r"\b([A-Za-z]{2,}[A-Za-z&.\s]*)\s+BS\s*\(\s*([IVX]+|\d{1,2})\s*\)",
    )
    .unwrap(),
    bs_sem_siss: Regex::new(r"\bBS\s+([IVX]+|\d{1,2})\s+(SISS|SSISS)\b").unwrap(),
    b_ed: Regex::new(r"\bB\.?Ed\s*[-/]?\s*([IVX]+|\d+)\b").unwrap(),
    anchor: Regex::new(
        r"(?i)\b(BSCS|BSSE|BSAI|BSMDS|BBA2Y|BBA|BSAF2Y|BSAF|BSDM|BSFT|Pharm-?D|PharmD|BS|DPT|RIT|HND|MLT)\b",
    )
    .unwrap(),
    anchor_tail: Regex::new(
        r"^\s*(?:[-/]\s*)?(?i:([IVX]+)|(\d{1,2})(?:st|nd|rd|th|([A-XZ])\b)?)(?:\s*-\s*(?i:([A-Z]))\b)?(?:[^a-zY]|$)",
    )
    .unwrap(),
    allied_list: Regex::new(
        r"\b((?:RIT|HND|MLT)(?:\s*(?:[,/&]|\band\b)\s*(?:RIT|HND|MLT))+)[\s,&/\-]*([IVX]+|\d{1,2}(?i:st|nd|rd|th)?)\b",
    )
    .unwrap(),
    allied_name: Regex::new(r"\b(RIT|HND|MLT)\b").unwrap(),
    allied_sem: Regex::new(r"\b(RIT|HND|MLT)\b\s*[-/&,]*\s*([IVX]+|\d{1,2}(?i:st|nd|rd|th)?)\b")
        .unwrap(),
    two_year_paren: Regex::new(r"\b(BSAF|BBA|BSDM|BSFT)\b\s*2Y\s*\(\s*([IVX]+|\d{1,2})\s*\)").unwrap(),
    two_year_dash: Regex::new(r"\b(BSAF|BBA|BSDM|BSFT)\b\s*2Y\s*[-/]\s*([IVX]+|\d{1,2})\b").unwrap(),
    two_year_bare: Regex::new(r"\b(BSAF|BBA|BSDM|BSFT)\b\s*2Y\b").unwrap(),
    bs_sem_code: Regex::new(r"\bBS\s*-?\s*([IVX]+|\d{1,2})\s*-\s*([A-Z]{2,})\b").unwrap(),
    bs_sem_list: Regex::new(r"\bBS\s+((?:[IVX]+|\d{1,2})(?:\s*,\s*(?:[IVX]+|\d{1,2}))+)").unwrap(),
    roman_or_digits: Regex::new(r"[IVX]+|\d{1,2}").unwrap(),
});

/// Ordered, duplicate-free accumulator of raw hits.
#[derive(Default)]
struct Hits {
    found: Vec<Cohort>,
    seen: HashSet<Cohort>,
}

impl Hits {
    fn push(&mut self, program: impl Into<String>, semester: impl Into<String>, section: impl Into<String>) {
        let cohort = Cohort::new(program, semester, section);
        if self.seen.insert(cohort.clone()) {
            self.found.push(cohort);
        }
    }

    fn push_spec(&mut self, spec: &str, semester: &str) {
        self.push(format!("BS {}", canonical_spec(spec)), semester_number(semester), "");
    }
}

fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Semester and section from a `(roman)|(digits)(glued section)` + `-(section)` capture.
fn anchored_semester_section(caps: &Captures<'_>) -> (String, String) {
    let semester = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    let section = caps.get(4).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
    (semester_number(semester), section.to_uppercase())
}

/// Every cohort mentioned in `text`, in discovery order.
pub fn extract_global_programs(text: &str) -> Vec<Cohort> {
    let mut hits = Hits::default();
    let f = &*FREE_TEXT;
    let norm = collapse_ws(text);

    for m in program_matches(text) {
        hits.push(m.cohort.program, m.cohort.semester, m.cohort.section);
    }

    // "BS <sem> <spec>" and "BS (<sem>) <spec>"
    for re in [&f.sem_then_spec, &f.paren_sem_then_spec] {
        for caps in re.captures_iter(&norm) {
            let spec = group(&caps, 2).trim();
            if is_recognised_spec(spec) {
                hits.push_spec(spec, group(&caps, 1));
            }
        }
    }
    // "BS <spec> <sem>", "BS <spec> (<sem>)", "BS <spec> - <sem>"
    for re in [&f.spec_then_sem, &f.spec_then_paren_sem, &f.spec_dash_sem] {
        for caps in re.captures_iter(&norm) {
            let spec = group(&caps, 1).trim();
            if is_recognised_spec(spec) {
                hits.push_spec(spec, group(&caps, 2));
            }
        }
    }
    // "BS Math (3rd + 0)"
    for caps in f.spec_paren_list.captures_iter(&norm) {
        let spec = group(&caps, 1).trim();
        if !is_recognised_spec(spec) {
            continue;
        }
        for token in f.semester_token.find_iter(group(&caps, 2)) {
            hits.push_spec(spec, token.as_str());
        }
    }

    for re in [&f.prefix_bs_sem, &f.prefix_bs_paren_sem] {
        for caps in re.captures_iter(&norm) {
            let prefix = group(&caps, 1).trim();
            let compact = prefix.to_uppercase().replace('.', "");
            if is_ignored_spec(prefix) || !ALLIED_PREFIXES.contains(&compact.trim()) {
                continue;
            }
            hits.push(compact.trim().to_string(), semester_number(group(&caps, 2)), "");
        }
    }

    for caps in f.bs_sem_siss.captures_iter(&norm) {
        hits.push("BS SISS", semester_number(group(&caps, 1)), "");
    }

    for caps in f.b_ed.captures_iter(&norm) {
        hits.push("B.Ed", semester_number(group(&caps, 1)), "");
    }

    for anchor in f.anchor.find_iter(text) {
        let program = canonical_program(anchor.as_str());
        let tail = &text[anchor.end()..];
        // "BSAF 2Y" belongs to the two-year pass below.
        if tail.trim_start().starts_with("2Y") {
            continue;
        }
        match f.anchor_tail.captures(tail) {
            Some(caps) => {
                let (semester, section) = anchored_semester_section(&caps);
                hits.push(program, semester, section);
            }
            None if SEMESTERLESS_ANCHORS.contains(&program.as_str()) => hits.push(program, "", ""),
            None => {}
        }
    }

    for caps in f.allied_list.captures_iter(&norm) {
        let semester = semester_number(group(&caps, 2));
        for name in f.allied_name.find_iter(group(&caps, 1)) {
            hits.push(name.as_str(), semester.clone(), "");
        }
    }
    for caps in f.allied_sem.captures_iter(&norm) {
        hits.push(group(&caps, 1), semester_number(group(&caps, 2)), "");
    }

    for re in [&f.two_year_paren, &f.two_year_dash] {
        for caps in re.captures_iter(&norm) {
            hits.push(format!("{}2Y", group(&caps, 1)), semester_number(group(&caps, 2)), "");
        }
    }
    for caps in f.two_year_bare.captures_iter(&norm) {
        hits.push(format!("{}2Y", group(&caps, 1)), "", "");
    }

    // "BS-VII-PSY"
    for caps in f.bs_sem_code.captures_iter(&norm) {
        hits.push_spec(group(&caps, 2), group(&caps, 1));
    }
    // "BS II, VI"
    for caps in f.bs_sem_list.captures_iter(&norm) {
        for token in f.roman_or_digits.find_iter(group(&caps, 1)) {
            hits.push("BS", semester_number(token.as_str()), "");
        }
    }

    finalize(hits.found)
}

fn dedup_case_insensitive(cohorts: Vec<Cohort>) -> Vec<Cohort> {
    let mut seen = HashSet::new();
    cohorts
        .into_iter()
        .filter(|c| seen.insert((c.program.to_lowercase(), c.semester.clone(), c.section.clone())))
        .collect()
}

fn canonical_cohort_program(program: &str) -> String {
    match program.strip_prefix("BS ") {
        Some(spec) => format!("BS {}", canonical_spec(spec)),
        None => canonical_program(program),
    }
}

fn finalize(raw: Vec<Cohort>) -> Vec<Cohort> {
    if raw.is_empty() {
        return raw;
    }

    // One section per (program, semester): the first non-empty one seen.
    let mut order: Vec<(String, String)> = Vec::new();
    let mut best: HashMap<(String, String), String> = HashMap::new();
    for c in raw {
        let key = (c.program, c.semester);
        match best.get_mut(&key) {
            Some(section) => {
                if section.is_empty() && !c.section.is_empty() {
                    *section = c.section;
                }
            }
            None => {
                order.push(key.clone());
                best.insert(key, c.section);
            }
        }
    }
    let cohorts: Vec<Cohort> = order
        .into_iter()
        .map(|key| {
            let section = best.remove(&key).unwrap_or_default();
            Cohort::new(canonical_cohort_program(&key.0), key.1, section)
        })
        .collect();

    let mut cohorts: Vec<Cohort> = dedup_case_insensitive(cohorts)
        .into_iter()
        .filter(|c| {
            c.program
                .strip_prefix("BS ")
                .and_then(|rest| rest.split_whitespace().next())
                .map_or(true, |word| !TITLE_TOKENS.contains(&word))
        })
        .collect();

    let spec_semesters: HashSet<String> = cohorts
        .iter()
        .filter(|c| c.program.starts_with("BS "))
        .map(|c| c.semester.clone())
        .collect();
    let other_semesters: HashSet<String> = cohorts
        .iter()
        .filter(|c| !c.program.starts_with("BS"))
        .map(|c| c.semester.clone())
        .collect();
    cohorts.retain(|c| {
        c.program != "BS"
            || !(spec_semesters.contains(&c.semester) || other_semesters.contains(&c.semester))
    });

    // Anchored programs with no semester borrow the cell's semester number.
    let has_first = cohorts.iter().any(|c| c.semester == "1");
    let smallest = cohorts
        .iter()
        .filter_map(|c| c.semester.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .min();
    let fill = if has_first { Some(1) } else { smallest };
    if let Some(fill) = fill {
        for c in cohorts.iter_mut() {
            let anchored = c.program.starts_with("BS ") || SEMESTERLESS_ANCHORS.contains(&c.program.as_str());
            if anchored && c.semester.is_empty() {
                c.semester = fill.to_string();
            }
        }
    }

    dedup_case_insensitive(cohorts)
}

static PHARM_D: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bPharm-?D\b").unwrap());
static DPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bDPT\b").unwrap());
static HND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)HND").unwrap());

/// Program implied by the department or by a bare program word in the text.
pub fn infer_program_from_context(department: &str, text: &str) -> String {
    let dept = department.trim();
    if PHARM_D.is_match(text) || dept.eq_ignore_ascii_case("PHARM-D") {
        return "PharmD".to_string();
    }
    if DPT.is_match(text) || dept.eq_ignore_ascii_case("DPT") {
        return "DPT".to_string();
    }
    if HND.is_match(dept) || dept.eq_ignore_ascii_case("human nutrition and dietetics") {
        return "HND".to_string();
    }
    String::new()
}

struct SemesterPatterns {
    anchored: Regex,
    roman_section: Regex,
    semester_word: Regex,
    ordinal_sem: Regex,
}

static SEMESTER: LazyLock<SemesterPatterns> = LazyLock::new(|| SemesterPatterns {
    anchored: Regex::new(
        r"\b(?i:BSCS|BSSE|BSAI|BBA2Y|BBA|BSAF2Y|BSAF|BSDM|BSFT|Pharm-?D|PharmD|BS|DPT|RIT|HND|MLT)\b[\s-]*(?i:([IVX]+)|(\d+)(?:st|nd|rd|th|([A-XZ])\b)?)(?:\s*-\s*(?i:([A-Z]))\b)?(?:[^a-z]|$)",
    )
    .unwrap(),
    roman_section: Regex::new(r"\b([IVX]{1,4})\s*-\s*([A-Z])\b").unwrap(),
    semester_word: Regex::new(r"(?i)\bSemester\s*#?\s*([IVX]+|\d+(?:st|nd|rd|th)?)\b").unwrap(),
    ordinal_sem: Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s*sem(?:ester|ster)\b").unwrap(),
});

/// Semester and section from any recognisable phrasing, program-anchored first.
pub fn semester_section_from_any(text: &str) -> (String, String) {
    let s = &*SEMESTER;
    if let Some(caps) = s.anchored.captures(text) {
        return anchored_semester_section(&caps);
    }
    if let Some(caps) = s.roman_section.captures(text) {
        return (semester_number(group(&caps, 1)), group(&caps, 2).to_string());
    }
    if let Some(caps) = s.semester_word.captures(text) {
        return (semester_number(group(&caps, 1)), String::new());
    }
    if let Some(caps) = s.ordinal_sem.captures(text) {
        return (group(&caps, 1).to_string(), String::new());
    }
    (String::new(), String::new())
}

static PUNCT_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\s,\-/()]+$").unwrap());
static LEADING_PROGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*[(,]*\s*(?:BSCS|BSSE|BSAI|BBA2Y|BBA|BSAF2Y|BSAF|BSDM|BSFT|Pharm-?D|PharmD|BS|DPT|RIT|HND|MLT)\b",
    )
    .unwrap()
});

/// A segment whose "subject" is really just a list of cohorts.
pub fn is_program_metadata_segment(segment: &str, subject: &str) -> bool {
    let subject = subject.trim();
    subject.is_empty()
        || PUNCT_ONLY.is_match(subject)
        || LEADING_PROGRAM.is_match(subject)
        || LEADING_PROGRAM.is_match(segment.trim())
}

/// Fill entries that have no program from the cell-wide cohort list.
///
/// Lists of equal length pair up one-to-one, a single cohort is broadcast,
/// anything else is assigned by position with the last cohort repeating.
pub fn assign_programs(entries: &mut [ClassEntry], full_text: &str) {
    let globals = extract_global_programs(full_text);
    if globals.is_empty() || entries.iter().all(|e| !e.program.is_empty()) {
        return;
    }
    if globals.len() == entries.len() {
        for (entry, cohort) in entries.iter_mut().zip(&globals) {
            if entry.program.is_empty() {
                entry.set_cohort(cohort);
            }
        }
        return;
    }
    let last = globals.len() - 1;
    for (idx, entry) in entries.iter_mut().filter(|e| e.program.is_empty()).enumerate() {
        entry.set_cohort(&globals[idx.min(last)]);
    }
}
