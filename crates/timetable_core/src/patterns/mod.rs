//! Pattern library
//!
//! Fixed, ordered catalogues of recognizers. Every catalogue is a list of
//! tagged entries tried in priority order; the first entry that yields a
//! usable match wins.
//!
//! ```text
//! course    course codes ("CS 210", "(CS-313)", "MATH.101", "CS 313/SE 313")
//! program   program/semester/section tokens ("BSCS-3A", "BS Physics IV", "DPT-II")
//! teacher   teacher name / SAP id shapes ("Dr. Ali Khan 10234")
//! room      room header and inline room mentions ("C-201 S.C: 40", "Room # 12")
//! reserved  reserved-slot markers ("Reserved", "slot used", "shifted")
//! ```

pub mod course;
pub mod program;
pub mod reserved;
pub mod room;
pub mod teacher;

pub use course::{find_course_code, has_course_code, CourseMatch};
pub use program::{
    canonical_program, canonical_spec, first_program_match, has_program_token,
    leftmost_program_match, program_matches, rightmost_program_match, ProgramMatch,
};
pub use reserved::is_reserved_cell;

/// Honorifics that introduce a teacher name.
pub(crate) const TITLE: &str = r"(?:Dr\.?|Prof\.?|Mr\.?|Ms\.?|Miss\.?|Mufti\.?)";

/// Title tokens as they appear after whitespace splitting.
pub(crate) const TITLE_TOKENS: &[&str] = &[
    "Dr.", "Dr", "Prof.", "Prof", "Mr.", "Mr", "Ms.", "Ms", "Miss.", "Miss", "Mufti.", "Mufti",
];
