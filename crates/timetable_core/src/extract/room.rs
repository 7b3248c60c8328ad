//! Room resolution.

use crate::patterns::room::{normalize_room_label, INLINE_ROOM_CATALOGUE, TRAILING_PAREN_ROOM};
use crate::text::{collapse_ws, norm_key};

/// Room name used when neither the row header nor the cell names a room.
pub const UNKNOWN_ROOM: &str = "Unknown/TBD";

fn inside_parens(text: &str, at: usize) -> bool {
    let before = &text[..at];
    before.matches('(').count() > before.matches(')').count()
}

fn trusts_paren_rooms(department: &str, paren_room_departments: &[String]) -> bool {
    let key = norm_key(department);
    paren_room_departments.iter().any(|d| norm_key(d) == key)
}

/// Room mentioned inside the cell text, if any.
///
/// Parenthesised mentions only count for departments that write rooms that way.
pub fn inline_room(text: &str, department: &str, paren_room_departments: &[String]) -> Option<String> {
    let trust_parens = trusts_paren_rooms(department, paren_room_departments);
    for pattern in INLINE_ROOM_CATALOGUE.iter() {
        let Some(caps) = pattern.regex.captures(text) else {
            continue;
        };
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if trust_parens || !inside_parens(text, whole.start()) {
            return Some(format!("{}{}", pattern.prefix, id.as_str()));
        }
    }
    if trust_parens {
        if let Some(id) = TRAILING_PAREN_ROOM.captures(text).and_then(|c| c.get(1)) {
            return Some(format!("Room {}", id.as_str()));
        }
    }
    None
}

/// Header label when it is a real room, else an inline mention, else [`UNKNOWN_ROOM`].
pub fn resolve_room(
    header_label: &str,
    header_valid: bool,
    text: &str,
    department: &str,
    paren_room_departments: &[String],
) -> String {
    if header_valid {
        return collapse_ws(&normalize_room_label(header_label));
    }
    inline_room(text, department, paren_room_departments).unwrap_or_else(|| UNKNOWN_ROOM.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paren_depts() -> Vec<String> {
        vec!["EDUCATION".to_string(), "PSYCHOLOGY".to_string()]
    }

    #[test]
    fn test_valid_header_wins() {
        assert_eq!(resolve_room("C-201", true, "OOP Room # 12", "CS & IT", &[]), "C-201");
        assert_eq!(resolve_room("Room#12 S.C: 30", true, "", "CS & IT", &[]), "Room 12 S.C: 30");
    }

    #[test]
    fn test_inline_room_without_header() {
        assert_eq!(resolve_room("", false, "Tafseer Room # 12 Dr. Ali", "ISLAMIC STUDY", &[]), "Room 12");
        assert_eq!(resolve_room("", false, "Networks Lab#3", "CS & IT", &[]), "Lab 3");
        assert_eq!(resolve_room("", false, "OOP Lab Mr. Tariq", "CS & IT", &[]), UNKNOWN_ROOM);
    }

    #[test]
    fn test_paren_rooms_only_for_listed_departments() {
        let text = "Child Psychology (Room 14) Ms. Hina";
        assert_eq!(resolve_room("", false, text, "PSYCHOLOGY", &paren_depts()), "Room 14");
        assert_eq!(resolve_room("", false, text, "CS & IT", &paren_depts()), UNKNOWN_ROOM);
        assert_eq!(resolve_room("", false, "Pedagogy Ms. Hina (204)", "Education", &paren_depts()), "Room 204");
    }
}
