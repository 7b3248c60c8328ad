//! Program/semester/section catalogue.

use crate::text::{collapse_ws, norm_key, semester_number, title_case};
use crate::types::Cohort;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// How the captures of a program pattern map onto a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramShape {
    /// `(program)(semester)(section?)`
    Coded,
    /// `(BS)(specialisation)(semester?)(section?)`
    Specialised,
}

pub struct ProgramPattern {
    pub name: &'static str,
    pub shape: ProgramShape,
    pub regex: Regex,
}

const PROGRAM_PATTERNS: &[(&str, ProgramShape, &str)] = &[
    (
        "cs_family",
        ProgramShape::Coded,
        r"(BSCS|BSSE|BSAI)\s*[-/]?\s*([IVX]+|\d+)(?:\s*-?\s*([A-Z]))?\b",
    ),
    ("cs_family_glued", ProgramShape::Coded, r"(BSCS|BSSE|BSAI)-?(\d+)([A-Z])\b"),
    ("cs_family_digits", ProgramShape::Coded, r"(BSCS|BSSE|BSAI)-?(\d+)\b"),
    (
        "pharm_d",
        ProgramShape::Coded,
        r"(Pharm-?D)\s+([IVX]+)\b(?:\s*-\s*([A-Z])\b)?",
    ),
    ("bba", ProgramShape::Coded, r"(BBA)-?([IVX]+)([A-Z]?)\b"),
    ("bba_2y_roman", ProgramShape::Coded, r"(BBA2Y)-?([IVX]+)([A-Z]?)\b"),
    ("bba_2y_digits", ProgramShape::Coded, r"(BBA2Y)-?(\d+)([A-Z]?)\b"),
    ("bsaf", ProgramShape::Coded, r"(BSAF)-?([IVX]+)([A-Z]?)\b"),
    ("bsaf_2y_roman", ProgramShape::Coded, r"(BSAF2Y)-?([IVX]+)([A-Z]?)\b"),
    ("bsaf_2y_digits", ProgramShape::Coded, r"(BSAF2Y)-?(\d+)([A-Z]?)\b"),
    ("bsdm", ProgramShape::Coded, r"(BSDM)-?([IVX]+)([A-Z]?)\b"),
    ("bsft", ProgramShape::Coded, r"(BSFT)-?([IVX]+)([A-Z]?)\b"),
    ("bs_digits", ProgramShape::Coded, r"(BS)\s+(\d+)([A-Z]?)\b"),
    ("bs_roman_glued", ProgramShape::Coded, r"(BS)-?([IVX]+)([A-Z]?)\b"),
    ("bs_roman", ProgramShape::Coded, r"(BS)\s*-?\s*([IVX]+)\s*([A-Z]?)\b"),
    (
        "bs_any_case",
        ProgramShape::Coded,
        r"(?i)(B\.?S)\s*-?\s*([IVX]+|\d+)\s*([A-Z]?)\b",
    ),
    ("dpt", ProgramShape::Coded, r"\b(DPT)\b-?([IVX]+)([A-Z]?)\b"),
    ("allied_health", ProgramShape::Coded, r"\b(RIT|HND|MLT)\b-?([IVX]+)([A-Z]?)\b"),
    (
        "allied_health_ordinal",
        ProgramShape::Coded,
        r"(?i)\b(RIT|HND|MLT)\b-?(\d+(?:ST|ND|RD|TH)?)([A-Z]?)\b",
    ),
    (
        "bs_specialisation",
        ProgramShape::Specialised,
        r"(?i)(BS)\s+(Mathematics\s+For\s+Data\s+Science|Biotechnology|Biotech|Zoology|Urdu|English|ENG|Mathematics|Maths|Math|Physics|Psychology|Criminology|Chemistry|Nursing|IR|SISS|SSISS)\b(?:\s*[-/]?\s*([IVX]+|\d+)\b)?(?:\s*-\s*([A-Z])\b)?",
    ),
    ("b_ed", ProgramShape::Coded, r"(?i)(B\.?Ed(?:u)?)\s*[-/]?\s*([IVX]+|\d+)\b"),
    ("bs_digit_section", ProgramShape::Coded, r"(BS)\s+(\d+)\s*([A-Z])\b"),
];

pub static PROGRAM_CATALOGUE: LazyLock<Vec<ProgramPattern>> = LazyLock::new(|| {
    PROGRAM_PATTERNS
        .iter()
        .map(|(name, shape, pattern)| ProgramPattern {
            name: *name,
            shape: *shape,
            regex: Regex::new(pattern).unwrap(),
        })
        .collect()
});

/// Specialisations accepted by the free-text "BS <spec>" families.
const RECOGNISED_SPECS: &[&str] = &[
    "Biotechnology",
    "Zoology",
    "Urdu",
    "English",
    "Mathematics",
    "Physics",
    "Psychology",
    "Criminology",
    "Chemistry",
    "Mathematics For Data Science",
    "IR",
    "Nursing",
    "SISS",
    "Education",
];

/// Course names that read like a specialisation.
const IGNORED_SPECS: &[&str] = &[
    "qr",
    "quantitative reasoning",
    "exploring quantitative skills",
    "general mathematics",
];

/// One catalogue hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMatch {
    pub cohort: Cohort,
    pub pattern: &'static str,
    pub start: usize,
    pub end: usize,
    /// Offset right after the last captured program component.
    pub anchor_end: usize,
}

/// Canonical spelling of a program code ("b.s" -> "BS", "Pharm-D" -> "PharmD").
pub fn canonical_program(raw: &str) -> String {
    let trimmed = raw.trim();
    let compact: String = trimmed
        .to_uppercase()
        .chars()
        .filter(|c| *c != '.' && *c != '-' && !c.is_whitespace())
        .collect();
    match compact.as_str() {
        "BS" => "BS".to_string(),
        "PHARMD" => "PharmD".to_string(),
        "BED" | "BEDU" => "B.Ed".to_string(),
        _ if trimmed.chars().all(|c| c.is_ascii_alphanumeric()) => trimmed.to_uppercase(),
        _ => trimmed.to_string(),
    }
}

/// Canonical spelling of a "BS <spec>" specialisation.
pub fn canonical_spec(raw: &str) -> String {
    let spec = collapse_ws(raw);
    let canonical = match spec.to_uppercase().as_str() {
        "MATH" | "MATHS" | "MATHEMATICS" => "Mathematics",
        "ENG" | "ENGLISH" => "English",
        "EDU" | "EDUCATION" | "B.ED" | "B.EDU" => "Education",
        "SISS" | "SSISS" => "SISS",
        "IR" => "IR",
        "BIOTECH" | "BIOTECHNOLOGY" => "Biotechnology",
        "PSY" | "PSYCHOLOGY" => "Psychology",
        "PHY" | "PHYSICS" => "Physics",
        "URDU" => "Urdu",
        _ => return title_case(&spec),
    };
    canonical.to_string()
}

/// Whether a free-text specialisation is one the engine trusts.
pub fn is_recognised_spec(raw: &str) -> bool {
    if is_ignored_spec(raw) {
        return false;
    }
    let canonical = canonical_spec(raw);
    RECOGNISED_SPECS.contains(&canonical.as_str())
}

pub fn is_ignored_spec(raw: &str) -> bool {
    IGNORED_SPECS.contains(&norm_key(raw).as_str())
}

fn section_of(caps: &Captures<'_>, group: usize) -> String {
    caps.get(group)
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_default()
}

impl ProgramPattern {
    fn decode(&self, caps: &Captures<'_>) -> Option<ProgramMatch> {
        let whole = caps.get(0)?;
        let anchor_end = (1..caps.len())
            .filter_map(|i| caps.get(i))
            .map(|m| m.end())
            .max()
            .unwrap_or(whole.end());
        let cohort = match self.shape {
            ProgramShape::Coded => Cohort::new(
                canonical_program(caps.get(1)?.as_str()),
                semester_number(caps.get(2)?.as_str()),
                section_of(caps, 3),
            ),
            ProgramShape::Specialised => Cohort::new(
                format!("BS {}", canonical_spec(caps.get(2)?.as_str())),
                caps.get(3).map(|m| semester_number(m.as_str())).unwrap_or_default(),
                section_of(caps, 4),
            ),
        };
        Some(ProgramMatch {
            cohort,
            pattern: self.name,
            start: whole.start(),
            end: whole.end(),
            anchor_end,
        })
    }
}

/// Every catalogue hit, grouped by pattern in priority order.
pub fn program_matches(text: &str) -> Vec<ProgramMatch> {
    PROGRAM_CATALOGUE
        .iter()
        .flat_map(|p| {
            p.regex
                .captures_iter(text)
                .filter_map(move |caps| p.decode(&caps))
        })
        .collect()
}

/// The first hit of the highest-priority pattern that matches.
pub fn first_program_match(text: &str) -> Option<ProgramMatch> {
    PROGRAM_CATALOGUE
        .iter()
        .find_map(|p| p.regex.captures(text).and_then(|caps| p.decode(&caps)))
}

/// The hit that starts earliest in the text.
pub fn leftmost_program_match(text: &str) -> Option<ProgramMatch> {
    program_matches(text).into_iter().fold(None, |best, m| match best {
        Some(b) if b.start <= m.start => Some(b),
        _ => Some(m),
    })
}

/// The hit that ends latest in the text; ties go to catalogue order.
pub fn rightmost_program_match(text: &str) -> Option<ProgramMatch> {
    program_matches(text).into_iter().fold(None, |best, m| match best {
        Some(b) if b.end >= m.end => Some(b),
        _ => Some(m),
    })
}

pub fn has_program_token(text: &str) -> bool {
    PROGRAM_CATALOGUE.iter().any(|p| p.regex.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohorts(text: &str) -> Vec<Cohort> {
        program_matches(text).into_iter().map(|m| m.cohort).collect()
    }

    #[test]
    fn test_cs_family_with_section() {
        let found = cohorts("Calculus I BSCS-3A, BSSE-3A Dr. Uzma 14521");
        assert_eq!(found[0], Cohort::new("BSCS", "3", "A"));
        assert_eq!(found[1], Cohort::new("BSSE", "3", "A"));
    }

    #[test]
    fn test_roman_semester_is_converted() {
        let m = first_program_match("Operating Systems BSCS-VI-B").unwrap();
        assert_eq!(m.cohort, Cohort::new("BSCS", "6", "B"));
        assert_eq!(m.pattern, "cs_family");
    }

    #[test]
    fn test_section_not_taken_from_a_name() {
        let m = first_program_match("BSSE 5 Ali Raza").unwrap();
        assert_eq!(m.cohort, Cohort::new("BSSE", "5", ""));
    }

    #[test]
    fn test_bs_specialisation() {
        let m = program_matches("Linear Algebra BS Maths IV-A Dr. Sana")
            .into_iter()
            .find(|m| m.pattern == "bs_specialisation")
            .unwrap();
        assert_eq!(m.cohort, Cohort::new("BS Mathematics", "4", "A"));
    }

    #[test]
    fn test_specialisation_ignores_word_starting_with_roman_letter() {
        let m = program_matches("BS English Introduction to Poetry")
            .into_iter()
            .find(|m| m.pattern == "bs_specialisation")
            .unwrap();
        assert_eq!(m.cohort, Cohort::new("BS English", "", ""));
    }

    #[test]
    fn test_pharm_d_and_allied_health() {
        assert_eq!(cohorts("Pharmacology Pharm-D III")[0], Cohort::new("PharmD", "3", ""));
        assert_eq!(cohorts("Anatomy DPT-II")[0], Cohort::new("DPT", "2", ""));
        assert_eq!(cohorts("Physiology RIT-2nd")[0], Cohort::new("RIT", "2", ""));
    }

    #[test]
    fn test_rightmost_match_and_anchor_end() {
        let text = "Calculus I BSCS-3A, BSSE-3A Dr. Uzma 14521";
        let m = rightmost_program_match(text).unwrap();
        assert_eq!(m.cohort.program, "BSSE");
        assert_eq!(text[m.anchor_end..].trim(), "Dr. Uzma 14521");
    }

    #[test]
    fn test_leftmost_match() {
        let m = leftmost_program_match("Ethics BBA-IV and BSCS-2").unwrap();
        assert_eq!(m.cohort.program, "BBA");
    }

    #[test]
    fn test_no_program_in_plain_subject() {
        assert!(!has_program_token("Data Structures (CS 210) Dr. Ali Khan 10234"));
        assert!(!has_program_token("Reserved"));
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_program("b.s"), "BS");
        assert_eq!(canonical_program("Pharm-D"), "PharmD");
        assert_eq!(canonical_program("B.Edu"), "B.Ed");
        assert_eq!(canonical_spec("MATHS"), "Mathematics");
        assert_eq!(canonical_spec("ssiss"), "SISS");
        assert_eq!(canonical_spec("mathematics  for data science"), "Mathematics For Data Science");
        assert!(is_recognised_spec("Eng"));
        assert!(!is_recognised_spec("Quantitative Reasoning"));
        assert!(!is_recognised_spec("Programming"));
    }
}
