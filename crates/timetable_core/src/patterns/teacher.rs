//! Teacher name / SAP id catalogue.

use super::TITLE;
use regex::Regex;
use std::sync::LazyLock;

pub struct TeacherPattern {
    pub name: &'static str,
    /// Group 2 carries a SAP id.
    pub has_id: bool,
    /// The match must not start at the beginning of the text.
    pub needs_prefix: bool,
    pub regex: Regex,
}

/// Tried in order against the whole cell once the program-anchored strategy fails.
pub static TEACHER_CATALOGUE: LazyLock<Vec<TeacherPattern>> = LazyLock::new(|| {
    let titled = format!(r"({TITLE}\s+[A-Za-z][A-Za-z\s.]*[A-Za-z])");
    let specs: Vec<(&'static str, bool, bool, String)> = vec![
        ("title_name_sap_label", true, false, format!(r"(?i)\b{titled}.*?SAP\s*ID\s*[:#-]?\s*(\d{{4,6}})\b")),
        ("title_name_slash_id", true, false, format!(r"(?i)\b{titled}.*?/\s*(\d{{4,6}})\b")),
        ("title_name_id", true, false, format!(r"(?i)\b{titled}\s*(\d{{4,6}})\b")),
        ("name_id", true, false, r"(?i)\b([A-Za-z][A-Za-z\s.]*[A-Za-z])\s*(\d{4,6})\s*(?:Room\b|$)".to_string()),
        ("name_paren_id", true, false, r"(?i)\b([A-Za-z][A-Za-z\s.]*[A-Za-z])\s*\((?:SAP\s*)?(\d{4,6})\)\s*(?:Room\b|$)".to_string()),
        ("title_name_end", false, false, format!(r"(?i)\b{titled}\b\s*(?:Room\b|$)")),
        ("title_name_anywhere", false, false, format!(r"(?i)\b({TITLE}\s*[A-Za-z][A-Za-z\s.]*[A-Za-z])\b")),
        ("bare_name_end", false, true, r"(?i)\b([A-Za-z][A-Za-z\s.]{2,}[A-Za-z])\s*$".to_string()),
    ];
    specs
        .into_iter()
        .map(|(name, has_id, needs_prefix, pattern)| TeacherPattern {
            name,
            has_id,
            needs_prefix,
            regex: Regex::new(&pattern).unwrap(),
        })
        .collect()
});

/// `Title First Last` with capitalized name tokens (case-sensitive).
pub static TITLED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({TITLE}\s+(?:[A-Z][a-z]+|[A-Z]\.)+(?:\s+(?:[A-Z][a-z]+|[A-Z]\.)){{0,3}})"
    ))
    .unwrap()
});

/// `<segment> (<Title Name>)` groups.
pub static PAREN_TEACHER_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\s*([^()]+?)\s*\(\s*((?:{TITLE})+\s+(?:[A-Z][a-z]+|[A-Z]\.)+(?:\s+(?:[A-Z][a-z]+|[A-Z]\.)){{0,3}})\s*\)"
    ))
    .unwrap()
});

/// Title + name followed by a parenthesized id, anywhere in the text.
pub static TITLED_NAME_PAREN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)({TITLE}\s+[A-Za-z][A-Za-z\s.]*[A-Za-z])\s*\(\s*(\d{{4,6}})\s*\)"
    ))
    .unwrap()
});

/// Text that opens with a title.
pub static LEADING_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*{TITLE}(?:\b|\s)")).unwrap());

/// A semester followed by a section token ("II-A", "3A", "4 - B").
pub static COHORT_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:[IVX]{1,4}|\d{1,2})\s*-?\s*([A-Za-z0-9]+)\b").unwrap());

/// First word of a name candidate, with the whitespace around it.
pub static LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9]+)\b\s*").unwrap());
