//! Room header and inline room catalogue.

use regex::Regex;
use std::sync::LazyLock;

/// `S.C: 40` seat-capacity marker in a room label.
pub static CAPACITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S\.?C\.?\s*:\s*(\d+)").unwrap());

/// SAP-style room code such as `C-201` or `B-LAB-2`.
pub static SAP_ROOM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]-[A-Z0-9\-]+)").unwrap());

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2,}\b").unwrap());
static LAB_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bLab\b").unwrap());

pub struct InlineRoomPattern {
    pub name: &'static str,
    /// Label prefix put in front of the captured identifier.
    pub prefix: &'static str,
    pub regex: Regex,
}

/// Identifiers must carry a digit so prose like "OOP Lab" is not a room.
const INLINE_ROOM_PATTERNS: &[(&str, &str, &str)] = &[
    ("room_no", "Room ", r"(?i)\bRoom\s*no\.?\s*(\d+)\b"),
    ("room_hash", "Room ", r"(?i)\bRoom\s*#\s*(\d+)\b"),
    ("room_token", "Room ", r"(?i)\bRoom\s*[#:]?\s*([A-Z0-9\-/]*\d[A-Z0-9\-/]*)"),
    ("lab_hash", "Lab ", r"(?i)\bLab\s*#\s*(\d+)\b"),
    ("lab_token", "Lab ", r"(?i)\bLab\s*[#:]?\s*([A-Z0-9\-/]*\d[A-Z0-9\-/]*)"),
];

pub static INLINE_ROOM_CATALOGUE: LazyLock<Vec<InlineRoomPattern>> = LazyLock::new(|| {
    INLINE_ROOM_PATTERNS
        .iter()
        .map(|(name, prefix, pattern)| InlineRoomPattern {
            name: *name,
            prefix: *prefix,
            regex: Regex::new(pattern).unwrap(),
        })
        .collect()
});

/// `(Room 204)` or `(204)` closing a cell.
pub static TRAILING_PAREN_ROOM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*(?:Room\s*)?(\d{2,4})\)\s*$").unwrap());

/// Digits from a capacity marker, or empty.
pub fn capacity_of(label: &str) -> String {
    CAPACITY
        .captures(label)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// SAP room code from a label, or empty.
pub fn sap_room_id_of(label: &str) -> String {
    SAP_ROOM
        .captures(label)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Whether a room row's first cell names a real room.
pub fn is_valid_room_header(label: &str) -> bool {
    let t = label.trim();
    if t.is_empty() {
        return false;
    }
    CAPACITY.is_match(t) || SAP_ROOM.is_match(t) || LEADING_NUMBER.is_match(t) || LAB_WORD.is_match(t)
}

/// "Room#12" -> "Room 12", "Lab#3" -> "Lab 3".
pub fn normalize_room_label(label: &str) -> String {
    label.replace("Room#", "Room ").replace("Lab#", "Lab ")
}
