//! Teacher name and SAP id extraction.
//!
//! Two strategies, tried in order:
//!
//! 1. Program-anchored: everything after the rightmost program token is the
//!    teacher tail, optionally closed by a 4-6 digit id.
//! 2. Catalogue: the ordered teacher patterns over the whole cell.
//!
//! A last resort picks up "Title Name (12345)" anywhere in the text. Every
//! candidate goes through the same clean-up pipeline.

use crate::patterns::program::rightmost_program_match;
use crate::patterns::teacher::{COHORT_SECTION, LEADING_TOKEN, TEACHER_CATALOGUE, TITLED_NAME_PAREN_ID};
use crate::patterns::{TITLE, TITLE_TOKENS};
use crate::text::collapse_ws;
use regex::Regex;
use std::sync::LazyLock;

/// Tokens after a title that extend the name budget by one.
const NAME_CONNECTORS: &[&str] = &["e", "bin", "binti", "al", "ul", "ur"];

/// Words that start a subject, not a surname.
const SUBJECT_KEYWORDS: &[&str] = &[
    "Entrepreneurship",
    "English",
    "Finance",
    "Marketing",
    "Quantitative",
    "Environmental",
    "Business",
    "Translation",
    "Understanding",
    "Industrial",
    "Operations",
    "Research",
    "Functional",
    "Creativity",
    "Innovation",
    "Science",
    "Law",
    "Taxation",
    "Product",
    "Development",
    "Sports",
    "Academic",
];

const SUBJECT_SUFFIXES: &[&str] = &["ship", "ment", "ing", "ion", "ance", "ics", "ology", "ography"];

/// First names recorded under "Mr." in the source sheets that belong to women.
const FEMALE_FIRST_NAMES: &[&str] = &[
    "Alishba", "Aneela", "Saba", "Sana", "Neeli", "Shaista", "Anam", "Aasma", "Kiran", "Maryam",
    "Muntaha", "Saira", "Bisma", "Ishwa", "Aneeba",
];

/// Bare specialisation words that are never a teacher.
const SPEC_WORDS: &[&str] = &[
    "URDU", "ENGLISH", "ENG", "MATH", "MATHEMATICS", "EDU", "EDUCATION", "IR", "SISS", "SSISS",
];

const MAX_NAME_TOKENS: usize = 4;

struct NamePatterns {
    first_listed: Regex,
    leading_room: Regex,
    leading_non_alpha: Regex,
    roman_section: Regex,
    roman_letter: Regex,
    program_prefixes: Vec<Regex>,
    roman_before_title: Regex,
    paren_id: Regex,
    any_id: Regex,
    tail_room: Regex,
    tail_lab: Regex,
    tail_sap: Regex,
    tail_paren: Regex,
    trailing_punct: Regex,
    trailing_small_number: Regex,
    leading_roman: Regex,
    leading_stray: Regex,
    inline_paren_id: Regex,
    open_paren_id: Regex,
    glued_code: Regex,
    trailing_program: Regex,
    rejected_words: Regex,
    leading_title: Regex,
    capitalised_name: Regex,
    bridging: Regex,
    bridging_prefix: Regex,
}

static NAME: LazyLock<NamePatterns> = LazyLock::new(|| NamePatterns {
    first_listed: Regex::new(r"\s*[,&/]\s*").unwrap(),
    leading_room: Regex::new(r"(?i)^\s*Room\b[\s#:\-]*[A-Za-z0-9/\-]+\s*").unwrap(),
    leading_non_alpha: Regex::new(r"^[^A-Za-z]+").unwrap(),
    roman_section: Regex::new(r"^\(?\s*[IVX]{1,4}\s*-\s*[A-Z]\)?\s+").unwrap(),
    roman_letter: Regex::new(r"\b[IVX]{1,4}\s*(?:-\s*([A-Z])|([A-Z]))\b").unwrap(),
    program_prefixes: [
        r"^\s*[A-Z]{2,}\s*[-/]*\s*[IVX]+(?:\s*/\s*[A-Z]{2,}\s*[-/]*\s*[IVX]+)*\b\s*,?\s*",
        r"^\s*(?i:BSCS|BSSE|BSAI|BBA2Y|BBA|BSAF2Y|BSAF|BSDM|BSFT|Pharm-?D|PharmD|BS|DPT|RIT|HND|MLT|SISS|SSISS)\b[\s-]*(?:[IVX]+\b|\d+)?(?:\s*-\s*[A-Z]\b)?\s*",
        r"^\s*(?i:Math(?:ematics)?|MATHS)\b[\s-]*(?:[IVX]+\b|\d+)?\s*",
        r"^\s*(?i:ENG|English|Urdu)\b[\s-]*(?:[IVX]+\b|\d+)?\s*",
        r"^\s*(?i:Edu|Education|B\.?Ed)\b[\s-]*(?:[IVX]+\b|\d+)?\s*",
        r"^\s*(?i:IR)\b[\s-]*(?:[IVX]+\b|\d+)?\s*",
        r"^\s*(?i:B\.S\.?|BS)(?:\b|\s)[\s-]*(?:[IVX]+\b|\d+)?\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect(),
    roman_before_title: Regex::new(&format!(r"^\s*[IVX]{{1,4}}(?:\s*[-/])?\s+({TITLE})")).unwrap(),
    paren_id: Regex::new(r"\(\s*(\d{4,6})\s*\)").unwrap(),
    any_id: Regex::new(r"(\d{4,6})").unwrap(),
    tail_room: Regex::new(r"(?i)\s*Room\b.*$").unwrap(),
    tail_lab: Regex::new(r"(?i)\s*Lab\b.*$").unwrap(),
    tail_sap: Regex::new(r"(?i)\s*\(SAP[^)]*\)\s*$").unwrap(),
    tail_paren: Regex::new(r"\s*\([^)]*\)\s*$").unwrap(),
    trailing_punct: Regex::new(r"[()\[\]{},;.:]+$").unwrap(),
    trailing_small_number: Regex::new(r"\s+\d{1,2}\s*$").unwrap(),
    leading_roman: Regex::new(r"^\s*-?\s*(?:X|IX|VIII|VII|VI|V|IV|III|II|I)\s+([A-Z])").unwrap(),
    leading_stray: Regex::new(r"^\s*(?:IR|R|I)\b\s+([A-Z][a-z])").unwrap(),
    inline_paren_id: Regex::new(r"\(\d{4,6}\)").unwrap(),
    open_paren_id: Regex::new(r"\(\d{4,6}$").unwrap(),
    glued_code: Regex::new(r"[A-Z]{3,}[\- ]?\d{3,}(?:\|\d+)?\s*").unwrap(),
    trailing_program: Regex::new(r"(?i)\s+(?:BS|BBA|BSAF|BSCS|BSSE|BSAI|Pharm-?D|DPT|RIT|HND)\b.*$").unwrap(),
    rejected_words: Regex::new(r"(?i)\b(?:reserved|slot|department|used|class)\b").unwrap(),
    leading_title: Regex::new(&format!(r"^{TITLE}(?:\b|\s)")).unwrap(),
    capitalised_name: Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3}$").unwrap(),
    bridging: Regex::new(r"(?i)^\s*(?:Bridging|merge\b|meerge\b)").unwrap(),
    bridging_prefix: Regex::new(r"(?i)^\s*(?:Bridging|merge\s+with\s+[A-Za-z/&\s]+|meerge\s+with\s+SIS)\s+").unwrap(),
});

/// Drop a leading "II-A"/section letter that repeats the cohort.
fn strip_leading_section_token(name: &str, full_text: &str, section: &str) -> String {
    let n = &*NAME;
    let stripped = n.roman_section.replace(name, "");
    if stripped != name {
        return stripped.into_owned();
    }
    if !section.is_empty() {
        let repeats_cohort = COHORT_SECTION
            .captures_iter(full_text)
            .any(|caps| caps.get(1).is_some_and(|m| m.as_str() == section));
        if let Some(caps) = LEADING_TOKEN.captures(name).filter(|_| repeats_cohort) {
            if let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) {
                if token.as_str() == section {
                    return name[whole.end()..].to_string();
                }
            }
        }
    }
    let letters: Vec<&str> = n
        .roman_letter
        .captures_iter(full_text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str())
        .collect();
    if let Some(first) = name.split_whitespace().next() {
        if first.len() == 1 && letters.contains(&first) {
            let rest = name.trim_start();
            return rest[first.len()..].trim_start().to_string();
        }
    }
    name.to_string()
}

fn strip_leading_program_token(name: &str) -> String {
    let n = &*NAME;
    let mut out = name.to_string();
    for re in &n.program_prefixes {
        out = re.replace(&out, "").into_owned();
    }
    n.roman_before_title.replace(&out, "$1").into_owned()
}

/// Strip "Room ..."/"Lab ..." tails, trailing parens, punctuation and stray numerals.
pub fn cleanup_name_tail(name: &str) -> String {
    let n = &*NAME;
    let s = name.trim();
    let s = n.tail_room.replace(s, "");
    let s = n.tail_lab.replace(s.trim(), "");
    let s = n.tail_sap.replace(s.trim(), "");
    let s = n.tail_paren.replace(s.trim(), "");
    let s = n.trailing_punct.replace(s.trim(), "");
    let s = n.trailing_small_number.replace(s.trim(), "");
    let s = n.leading_roman.replace(s.trim(), "$1");
    let s = n.leading_stray.replace(&s, "$1");
    collapse_ws(&s)
}

/// Keep at most four name tokens after the title (five with a connector),
/// then cut at the first token that starts a subject.
pub fn cap_name_tokens(name: &str) -> String {
    let n = &*NAME;
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.is_empty() {
        return String::new();
    }
    let kept: Vec<&str> = if TITLE_TOKENS.contains(&parts[0]) {
        let after = &parts[1..];
        let mut limit = MAX_NAME_TOKENS;
        for i in 0..after.len().min(MAX_NAME_TOKENS) {
            if NAME_CONNECTORS.contains(&after[i].to_lowercase().as_str()) && i + 1 < after.len() {
                limit = (MAX_NAME_TOKENS + 1).min(after.len());
            }
        }
        std::iter::once(parts[0])
            .chain(after.iter().take(limit).copied())
            .collect()
    } else {
        parts.into_iter().take(MAX_NAME_TOKENS).collect()
    };

    let out = kept.join(" ");
    let out = n.trailing_punct.replace(out.trim(), "");
    let out = n.inline_paren_id.replace_all(out.trim(), "");
    let out = n.open_paren_id.replace(out.trim(), "");
    let out = n.glued_code.replace_all(out.trim(), "");

    let toks: Vec<&str> = out.split_whitespace().collect();
    let cut = toks.iter().enumerate().skip(1).find_map(|(idx, tok)| {
        let low = tok.to_lowercase();
        let subject_like = SUBJECT_KEYWORDS.contains(tok)
            || (tok.len() > 8 && SUBJECT_SUFFIXES.iter().any(|suf| low.ends_with(suf)));
        subject_like.then_some(idx)
    });
    match cut {
        Some(idx) => toks[..idx].join(" "),
        None => toks.join(" "),
    }
}

/// "Mr. Sana ..." -> "Ms. Sana ...".
pub fn normalize_title(name: &str) -> String {
    let mut parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() > 1 && matches!(parts[0], "Mr." | "Mr") && FEMALE_FIRST_NAMES.contains(&parts[1]) {
        parts[0] = "Ms.";
    }
    parts.join(" ")
}

/// Tail clean-up followed by the token cap, for names cut out by a split rule.
pub fn tidy_teacher_name(raw: &str) -> String {
    normalize_title(&cap_name_tokens(&cleanup_name_tail(raw)))
}

/// Full clean-up of a raw teacher candidate.
fn polish(raw: &str, full_text: &str, section: &str) -> String {
    let n = &*NAME;
    let first = n.first_listed.split(raw).next().unwrap_or_default();
    let name = n.leading_room.replace(first, "");
    let name = n.leading_non_alpha.replace(name.trim(), "");
    let name = strip_leading_section_token(&name, full_text, section);
    let name = strip_leading_program_token(&name);
    let name = cleanup_name_tail(&name);
    let name = normalize_title(&cap_name_tokens(&name));
    let name = n.trailing_program.replace(&name, "");
    cleanup_name_tail(&name)
}

fn is_rejected(name: &str) -> bool {
    NAME.rejected_words.is_match(name)
}

fn from_program_tail(text: &str, section: &str) -> Option<(String, String)> {
    let n = &*NAME;
    let anchor = rightmost_program_match(text)?;
    let after = text[anchor.anchor_end..].trim();
    if after.is_empty() {
        return None;
    }

    let id = n
        .paren_id
        .captures(after)
        .or_else(|| n.any_id.captures(after))
        .and_then(|c| Some((c.get(0)?.start(), c.get(1)?.as_str().to_string())));

    if let Some((id_start, id)) = id {
        let name_part = n.leading_room.replace(after[..id_start].trim(), "");
        if name_part.trim().is_empty() {
            return None;
        }
        let name = polish(name_part.trim(), text, section);
        return (!name.is_empty()).then_some((name, id));
    }

    let tail = collapse_ws(after);
    let tail = n.leading_room.replace(&tail, "");
    let tail = n.leading_non_alpha.replace(tail.trim(), "");
    let tail = strip_leading_section_token(&tail, text, section);
    let tail = strip_leading_program_token(&tail);
    if tail.trim().len() <= 2 {
        return None;
    }
    let name = polish(&tail, text, section);
    let plausible = n.leading_title.is_match(&name) || n.capitalised_name.is_match(&name);
    let spec_word = SPEC_WORDS.contains(&name.trim().to_uppercase().as_str());
    (plausible && !spec_word && !is_rejected(&name)).then_some((name, String::new()))
}

/// "Title Name (12345)" anywhere in the text.
fn titled_with_paren_id(text: &str) -> Option<(String, String)> {
    let caps = TITLED_NAME_PAREN_ID.captures(text)?;
    let name = tidy_teacher_name(caps.get(1)?.as_str());
    let name = NAME.bridging_prefix.replace(&name, "").into_owned();
    Some((collapse_ws(&name), caps.get(2)?.as_str().to_string()))
}

fn from_catalogue(text: &str, section: &str) -> Option<(String, String)> {
    for pattern in TEACHER_CATALOGUE.iter() {
        let Some(caps) = pattern.regex.captures(text) else {
            continue;
        };
        let Some(whole) = caps.get(0) else { continue };
        if pattern.needs_prefix && whole.start() == 0 {
            continue;
        }
        let Some(raw) = caps.get(1) else { continue };
        let mut name = polish(raw.as_str().trim(), text, section);
        let mut id = if pattern.has_id {
            caps.get(2).map(|m| m.as_str().to_string())
        } else {
            None
        };

        if NAME.bridging.is_match(&name) || name.split_whitespace().count() <= 3 {
            if let Some((full_name, full_id)) = titled_with_paren_id(text) {
                name = full_name;
                if pattern.has_id {
                    id = Some(full_id);
                }
            }
        }
        if is_rejected(&name) {
            continue;
        }
        let id = id.unwrap_or_else(|| {
            NAME.any_id
                .captures(&text[whole.end()..])
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        });
        return Some((collapse_ws(&name), id));
    }
    None
}

/// `(teacher_name, teacher_sap_id)`; both empty when nothing plausible is found.
///
/// `section` is the cohort section already recovered for the cell, used to
/// strip a repeated section letter from the front of the name.
pub fn teacher_info(text: &str, section: &str) -> (String, String) {
    from_program_tail(text, section)
        .or_else(|| from_catalogue(text, section))
        .or_else(|| titled_with_paren_id(text))
        .unwrap_or_default()
}
