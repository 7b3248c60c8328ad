//! Course-code catalogue.

use regex::Regex;
use std::sync::LazyLock;

/// How the captures of a course pattern map onto a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeShape {
    /// `PREFIX NUMBER`
    Single,
    /// `PREFIX NUMBER / [PREFIX] NUMBER`
    CrossListed,
}

pub struct CoursePattern {
    pub name: &'static str,
    pub shape: CodeShape,
    pub regex: Regex,
}

/// Priority order matters: cross-listed codes first, the glued form last.
const COURSE_PATTERNS: &[(&str, CodeShape, &str)] = &[
    (
        "cross_listed",
        CodeShape::CrossListed,
        r"\b([A-Z]+)\s*-?\s*(\d{3,5})\s*/\s*([A-Z]+)?\s*(\d{3,5})\b",
    ),
    (
        "paren_cross_listed",
        CodeShape::CrossListed,
        r"\(([A-Z]+)\s*(\d{3,5})\s*/\s*([A-Z]+)?\s*(\d{3,5})\)",
    ),
    ("dotted", CodeShape::Single, r"\b([A-Z]+)\.(\d{3,5})(?:\|\d{1,2})?\b"),
    ("bare", CodeShape::Single, r"\b([A-Z]+)\s*-?\s*(\d{3,5})(?:/\d{1,2})?\b"),
    ("parenthesized", CodeShape::Single, r"\(([A-Z]+)\s*(\d{3,5})(?:/\d{1,2})?\)"),
    ("parenthesized_lab", CodeShape::Single, r"\(([A-Z]+)\s*-?\s*(\d{3,5})L\)"),
    (
        "alnum_dotted",
        CodeShape::Single,
        r"\b([A-Z][A-Z0-9]+)\s*[.-]+\s*(\d{3,5})(?:\|\d{1,2})?\b",
    ),
    (
        "alnum_bare",
        CodeShape::Single,
        r"\b([A-Z][A-Z0-9]+)\s*-?\s*(\d{3,5})(?:/\d{1,2})?\b",
    ),
    (
        "alnum_parenthesized",
        CodeShape::Single,
        r"\(([A-Z][A-Z0-9]+)\s*-?\s*(\d{3,5})(?:/\d{1,2})?\)",
    ),
    ("glued", CodeShape::Single, r"\b([A-Z]{2,})(\d{3,5})(?:\D|$)"),
];

/// Prefixes that look like codes but label rooms or ids.
const IGNORED_PREFIXES: &[&str] = &["ROOM", "ROOM#", "LAB", "SAP"];

pub static COURSE_CATALOGUE: LazyLock<Vec<CoursePattern>> = LazyLock::new(|| {
    COURSE_PATTERNS
        .iter()
        .map(|(name, shape, pattern)| CoursePattern {
            name: *name,
            shape: *shape,
            regex: Regex::new(pattern).unwrap(),
        })
        .collect()
});

/// Cosmetic rewrites applied before code matching.
struct CodeCleanup {
    paren_dashes: Regex,
    bare_dashes: Regex,
    paren_spacing: Regex,
    glued_cross: Regex,
    paren_glued_cross: Regex,
}

static CLEANUP: LazyLock<CodeCleanup> = LazyLock::new(|| CodeCleanup {
    paren_dashes: Regex::new(r"\(([A-Z]{2,})\s*-{2,}\s*(\d{3,5})(?:\|\d+)?\)").unwrap(),
    bare_dashes: Regex::new(r"\b([A-Z]{2,})\s*-{2,}\s*(\d{3,5})(?:\|\d+)?\b").unwrap(),
    paren_spacing: Regex::new(r"\(([A-Z]{2,})[\s-]*(\d{3,5})(?:\|\d+)?\)").unwrap(),
    glued_cross: Regex::new(r"\b([A-Z]{2,})(\d{3,5})\s*/\s*[A-Z]{2,}\d{3,5}\b").unwrap(),
    paren_glued_cross: Regex::new(r"\(([A-Z]{2,})(\d{3,5})\s*/\s*[A-Z]{2,}\d{3,5}\)").unwrap(),
});

/// Normalize dash runs and glued cross-listings ("CS---313" -> "CS 313").
pub fn clean_code_noise(text: &str) -> String {
    let c = &*CLEANUP;
    let out = c.paren_dashes.replace_all(text, "($1 $2)");
    let out = c.bare_dashes.replace_all(&out, "$1 $2");
    let out = c.paren_spacing.replace_all(&out, "($1 $2)");
    let out = c.glued_cross.replace_all(&out, "$1 $2");
    let out = c.paren_glued_cross.replace_all(&out, "($1 $2)");
    out.into_owned()
}

/// A recognized course code and where it sits in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseMatch {
    pub code: String,
    pub pattern: &'static str,
    /// Byte offset where the whole match starts.
    pub start: usize,
    /// Byte offset right after the code itself (closing parens included).
    pub end: usize,
}

/// First course code in catalogue order.
pub fn find_course_code(text: &str) -> Option<CourseMatch> {
    for pattern in COURSE_CATALOGUE.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(prefix) = caps.get(1) else { continue };
            if IGNORED_PREFIXES.contains(&prefix.as_str().to_uppercase().as_str()) {
                continue;
            }
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let (code, code_end) = match pattern.shape {
                CodeShape::Single => (format!("{} {}", prefix.as_str(), number.as_str()), number.end()),
                CodeShape::CrossListed => {
                    let Some(second) = caps.get(4) else { continue };
                    let second_prefix = caps.get(3).map_or(prefix.as_str(), |m| m.as_str());
                    (
                        format!(
                            "{} {}/{} {}",
                            prefix.as_str(),
                            number.as_str(),
                            second_prefix,
                            second.as_str()
                        ),
                        second.end(),
                    )
                }
            };
            // Parenthesized forms own their closing paren.
            let end = if whole.as_str().ends_with(')') { whole.end() } else { code_end };
            return Some(CourseMatch {
                code,
                pattern: pattern.name,
                start: whole.start(),
                end,
            });
        }
    }
    None
}

/// Any catalogue pattern matches anywhere in the text.
pub fn has_course_code(text: &str) -> bool {
    COURSE_CATALOGUE.iter().any(|p| p.regex.is_match(text))
}
