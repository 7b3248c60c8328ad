//! Small text utilities shared by every extraction stage.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Typos corrected on raw cell text before any rule runs.
const RAW_TYPOS: &[(&str, &str)] = &[("Quantitaive", "Quantitative"), ("Digitial", "Digital")];

/// Typos corrected on extracted subjects.
const SUBJECT_TYPOS: &[(&str, &str)] = &[
    ("Anaysis", "Analysis"),
    ("Excercises", "Exercises"),
    ("Quantitaive", "Quantitative"),
    ("Digitial", "Digital"),
    ("Implmentation", "Implementation"),
];

fn compile_word_fixes(table: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    table
        .iter()
        .map(|(wrong, right)| (Regex::new(&format!(r"(?i)\b{}\b", wrong)).unwrap(), *right))
        .collect()
}

static RAW_FIXES: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile_word_fixes(RAW_TYPOS));
static SUBJECT_FIXES: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile_word_fixes(SUBJECT_TYPOS));

const ROMAN_NUMERALS: &[(&str, &str)] = &[
    ("I", "1"),
    ("II", "2"),
    ("III", "3"),
    ("IV", "4"),
    ("V", "5"),
    ("VI", "6"),
    ("VII", "7"),
    ("VIII", "8"),
    ("IX", "9"),
    ("X", "10"),
];

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_ws(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Join the physical lines of a multi-line cell into one single-spaced string.
pub fn join_cell_lines(cell: &str) -> String {
    cell.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply the raw-text spelling pass.
pub fn fix_raw_typos(text: &str) -> String {
    apply_fixes(&RAW_FIXES, text)
}

/// Apply the subject spelling pass.
pub fn fix_subject_typos(text: &str) -> String {
    apply_fixes(&SUBJECT_FIXES, text)
}

fn apply_fixes(fixes: &[(Regex, &'static str)], text: &str) -> String {
    let mut out = text.to_string();
    for (re, right) in fixes {
        if re.is_match(&out) {
            out = re.replace_all(&out, *right).into_owned();
        }
    }
    out
}

/// Comparison key: lowercase, `&` spelled as "and", whitespace collapsed.
pub fn norm_key(s: &str) -> String {
    collapse_ws(&s.to_lowercase().replace('&', "and"))
}

/// Convert a semester token ("IV", "3", "2nd") into its digit form.
///
/// Unknown tokens are returned unchanged.
pub fn semester_number(token: &str) -> String {
    let trimmed = token.trim();
    let upper = trimmed.to_uppercase();
    let digits: String = upper.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let suffix = &upper[digits.len()..];
        if suffix.is_empty() || matches!(suffix, "ST" | "ND" | "RD" | "TH") {
            return digits;
        }
    }
    ROMAN_NUMERALS
        .iter()
        .find(|(roman, _)| *roman == upper)
        .map(|(_, number)| (*number).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Title-case every alphabetic run ("b.ed" -> "B.Ed", "data science" -> "Data Science").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// True when the string has letters and all of them are uppercase.
pub fn is_upper(s: &str) -> bool {
    s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase)
}

/// Split a "HH:MM-HH:MM" label into its start and end halves.
pub fn slot_bounds(slot: &str) -> Option<(&str, &str)> {
    let (start, end) = slot.split_once('-')?;
    Some((start.trim(), end.trim()))
}

/// Slot A is immediately followed by slot B when A's end equals B's start.
pub fn slots_consecutive(a: &str, b: &str) -> bool {
    match (slot_bounds(a), slot_bounds(b)) {
        (Some((_, end)), Some((start, _))) => !end.is_empty() && end == start,
        _ => false,
    }
}
