//! Reserved-slot markers.

use super::{course::has_course_code, program::has_program_token};
use regex::RegexSet;
use std::sync::LazyLock;

const RESERVED_MARKERS: &[(&str, &str)] = &[
    ("reserved", r"(?i)^\s*(?:cs\s*|math\s*|dms\s*)?reserved\s*$"),
    ("slot_used", r"(?i)\bslot\s*used\b"),
    ("new_hiring", r"(?i)^\s*new\s*(?:hiring|appointment)\s*$"),
    ("shifted", r"(?i)\bshifted\b"),
    ("moved", r"(?i)\bmoved\b"),
    ("cancelled", r"(?i)\bcancell?ed\b"),
];

static RESERVED_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(RESERVED_MARKERS.iter().map(|(_, p)| *p)).unwrap());

/// Names of the markers present in `text`.
pub fn reserved_markers(text: &str) -> Vec<&'static str> {
    RESERVED_SET
        .matches(text)
        .into_iter()
        .map(|i| RESERVED_MARKERS[i].0)
        .collect()
}

/// Blank cells and marker-only cells carry no class.
///
/// A marker next to a real program token or course code does not count:
/// "BSCS-3A OOP (shifted from Room 4)" is still a class.
pub fn is_reserved_cell(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    if has_program_token(text) || has_course_code(text) {
        return false;
    }
    RESERVED_SET.is_match(text)
}
