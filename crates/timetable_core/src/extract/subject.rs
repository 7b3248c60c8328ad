//! Subject and course-code extraction.

use crate::patterns::course::{clean_code_noise, find_course_code};
use crate::patterns::program::leftmost_program_match;
use crate::patterns::teacher::LEADING_TITLE;
use crate::patterns::TITLE;
use crate::text::{collapse_ws, fix_subject_typos};
use regex::Regex;
use std::sync::LazyLock;

struct SubjectPatterns {
    paren_body: Regex,
    bs_phrase: Regex,
    title: Regex,
    lab_after_code: Regex,
    lab_word: Regex,
    leading_comma: Regex,
    inline_room: Regex,
    inline_lab: Regex,
    dash_lab_tail: Regex,
    slash_runs: Regex,
    trailing_program_group: Regex,
    trailing_semester: Regex,
    trailing_ordinal_sem: Regex,
    leading_punct: Regex,
    empty_parens: Regex,
}

static SUBJECT: LazyLock<SubjectPatterns> = LazyLock::new(|| SubjectPatterns {
    paren_body: Regex::new(r"\(([^)]{3,})\)").unwrap(),
    bs_phrase: Regex::new(r"(?i)\bBS\s+[A-Za-z][A-Za-z\s&]+\s*(?:[-/]?\s*[IVX]+|\s*\d+)?\b").unwrap(),
    title: Regex::new(&format!(r"\b{TITLE}(?:\b|\s)")).unwrap(),
    lab_after_code: Regex::new(r"\b[lL]ab\b").unwrap(),
    lab_word: Regex::new(r"(?i)\blab\b").unwrap(),
    leading_comma: Regex::new(r"^\s*,\s*").unwrap(),
    inline_room: Regex::new(r"(?i)\bRoom\s*[#:]?\s*[A-Za-z0-9\-/]*\d[A-Za-z0-9\-/]*").unwrap(),
    inline_lab: Regex::new(r"(?i)\bLab\s*[#:]?\s*[A-Za-z0-9\-/]*\d[A-Za-z0-9\-/]*").unwrap(),
    dash_lab_tail: Regex::new(r"(?i)\s*-\s*Lab\b.*$").unwrap(),
    slash_runs: Regex::new(r"/{2,}").unwrap(),
    trailing_program_group: Regex::new(
        r"(?i)\s*\([^)]*\b(?:BS|B\.?Ed|English|ENG|Maths|Mathematics|Urdu|Zoology|Psychology|SISS|SSISS|Nursing|BBA|BSAF|BSCS|BSSE|BSAI|BSMDS)\b[^)]*\)\s*$",
    )
    .unwrap(),
    trailing_semester: Regex::new(
        r"(?i)\s*\(?\s*Semester\s*#?\s*(?:[IVX]+|\d+(?:st|nd|rd|th)?)\s*\)?\s*$",
    )
    .unwrap(),
    trailing_ordinal_sem: Regex::new(r"(?i)\s*\b\d{1,2}(?:st|nd|rd|th)\s*sem(?:ester|ster)\b\s*$").unwrap(),
    leading_punct: Regex::new(r"^[(),;/\-\s]+").unwrap(),
    empty_parens: Regex::new(r"\(\s*\)$").unwrap(),
});

/// Text before `cut`, or before the last opening paren ahead of it.
fn prefix_before(text: &str, cut: usize) -> &str {
    match text[..cut].rfind('(') {
        Some(paren) => &text[..paren],
        None => &text[..cut],
    }
}

/// Locate the subject phrase, returning it raw together with the course code.
fn locate(text: &str) -> (String, String) {
    let s = &*SUBJECT;
    let cleaned = clean_code_noise(text);
    let mut body = cleaned.as_str();

    // "Dr. X (Subject CS 101)" puts the subject inside the parens.
    if LEADING_TITLE.is_match(body) {
        if let Some(inner) = s.paren_body.captures(body).and_then(|c| c.get(1)) {
            body = inner.as_str().trim();
        }
    }

    if let Some(code) = find_course_code(body) {
        let mut subject = body[..code.start].trim().to_string();
        if s.lab_after_code.is_match(&body[code.end..]) && !s.lab_word.is_match(&subject) {
            subject.push_str(" Lab");
        }
        return (subject, collapse_ws(&code.code));
    }

    let subject = if let Some(program) = leftmost_program_match(body) {
        prefix_before(body, program.start)
    } else if let Some(phrase) = s.bs_phrase.find(body) {
        prefix_before(body, phrase.start())
    } else if let Some(title) = s.title.find(body) {
        if title.start() <= 2 {
            &body[title.end()..]
        } else {
            &body[..title.start()]
        }
    } else {
        body
    };
    (subject.trim().to_string(), String::new())
}

fn tidy(subject: &str) -> String {
    let s = &*SUBJECT;
    let out = s.leading_comma.replace(subject, "");
    let out = s.inline_room.replace_all(&out, "");
    let out = s.inline_lab.replace_all(&out, "");
    let out = s.dash_lab_tail.replace(&out, "");
    let out = s.slash_runs.replace_all(&out, "/");
    let out = s.trailing_program_group.replace(&out, "");
    let out = s.trailing_semester.replace(&out, "");
    let out = s.trailing_ordinal_sem.replace(&out, "");
    let out = s.leading_punct.replace(&out, "");
    let out = out
        .trim_end_matches('(')
        .trim_end_matches(',')
        .trim_end_matches('-')
        .trim();
    let out = s.empty_parens.replace(out, "");
    let out = collapse_ws(&out);
    let out = s.lab_word.replace_all(&out, "Lab");
    fix_subject_typos(&out)
}

/// `(subject, course_code)` for one class description.
///
/// The subject is whatever precedes the course code; without a code it is
/// the text before the first program token, "BS <spec>" phrase or teacher
/// title, in that order of preference.
pub fn subject_and_code(text: &str) -> (String, String) {
    let (raw, code) = locate(text);
    (tidy(&raw), code)
}
