//! Field extractors
//!
//! Each extractor reads one field family out of free cell text. They share
//! the pattern catalogues but not state, so the interpreter can call them on
//! a whole cell or on any segment of one.

pub mod room;
pub mod subject;
pub mod teacher;

pub use room::{resolve_room, UNKNOWN_ROOM};
pub use subject::subject_and_code;
pub use teacher::{teacher_info, tidy_teacher_name};
