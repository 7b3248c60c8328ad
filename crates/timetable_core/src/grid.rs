//! Grid decoding and segmentation
//!
//! The CSV export loses merged-cell information, so the only structure left
//! is row shape. Each row is classified on its own, with a small scan state
//! (current department, day and slot list) carried from row to row:
//!
//! ```text
//! "CS & IT - Monday"            department header   -> new block
//! ,08:00-09:00,09:00-10:00      time-slot header    -> block slots
//! C-201 S.C: 40,<cell>,<cell>   room row            -> block rows
//! Room/Labs,,                   filler              -> skipped
//! ```

use crate::error::Result;
use crate::text::{collapse_ws, title_case};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Rows x cells, exactly as decoded.
pub type Grid = Vec<Vec<String>>;

static DEPARTMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([A-Z][A-Za-z\s&/()\-']{2,120})\s*(?:-\s*)?(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b",
    )
    .unwrap()
});

static TIME_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})").unwrap());

static TRAILING_HYPHEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*$").unwrap());

static FILLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Room\s*/\s*Labs").unwrap());

/// Decode CSV text into a grid. Rows may have different lengths.
pub fn decode(text: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut grid = Grid::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// How one physical row was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Blank,
    DepartmentHeader { department: String, day: String },
    TimeSlotHeader(Vec<String>),
    RoomRow,
    Filler,
    /// Non-blank row with no active department or slot list.
    Orphan,
}

/// `(department, day)` when the first cell reads "<name> - <DayName>".
pub fn department_header(row: &[String]) -> Option<(String, String)> {
    let first = row.first()?.trim();
    let caps = DEPARTMENT_HEADER.captures(first)?;
    let name = collapse_ws(caps.get(1)?.as_str());
    let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
    let name = TRAILING_HYPHEN.replace(name, "").trim().to_string();
    let day = title_case(caps.get(2)?.as_str());
    Some((name, day))
}

/// Slot labels from every cell after the first that holds an "HH:MM-HH:MM" range.
pub fn time_slots(row: &[String]) -> Vec<String> {
    row.iter()
        .skip(1)
        .filter_map(|cell| TIME_SLOT.captures(cell.trim()))
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
        .collect()
}

/// A cell that is nothing but a time range.
pub fn is_time_range_only(text: &str) -> bool {
    TIME_SLOT
        .find(text.trim())
        .is_some_and(|m| m.start() == 0 && m.end() == text.trim().len())
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// One physical room with its per-slot cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRow {
    /// Index of the row in the grid.
    pub index: usize,
    /// First cell, trimmed. May be blank.
    pub label: String,
    /// Every cell after the first; cell `i` belongs to slot `i`.
    pub cells: Vec<String>,
}

/// Rows under one department/day header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub department: String,
    pub day: String,
    pub time_slots: Vec<String>,
    pub rows: Vec<RoomRow>,
}

impl Block {
    /// `(slot, cell)` pairs of a row, limited to the known slots.
    pub fn slot_cells<'a>(&'a self, row: &'a RoomRow) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.time_slots
            .iter()
            .zip(row.cells.iter())
            .map(|(slot, cell)| (slot.as_str(), cell.as_str()))
    }
}

/// Result of scanning a whole grid.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub blocks: Vec<Block>,
    pub kinds: Vec<RowKind>,
}

/// Classify every row and group room rows into blocks.
pub fn segment(grid: &Grid) -> Segmentation {
    let mut seg = Segmentation::default();

    for (index, row) in grid.iter().enumerate() {
        let kind = classify(row, seg.blocks.last());
        match &kind {
            RowKind::DepartmentHeader { department, day } => {
                if let Some(prev) = seg.blocks.last() {
                    if prev.time_slots.is_empty() {
                        warn!(department = %prev.department, day = %prev.day, "Department block has no time-slot header");
                    }
                }
                seg.blocks.push(Block {
                    department: department.clone(),
                    day: day.clone(),
                    time_slots: Vec::new(),
                    rows: Vec::new(),
                });
            }
            RowKind::TimeSlotHeader(slots) => {
                if let Some(block) = seg.blocks.last_mut() {
                    block.time_slots = slots.clone();
                }
            }
            RowKind::RoomRow => {
                if let Some(block) = seg.blocks.last_mut() {
                    block.rows.push(RoomRow {
                        index,
                        label: row.first().map(|c| c.trim().to_string()).unwrap_or_default(),
                        cells: row.iter().skip(1).cloned().collect(),
                    });
                }
            }
            RowKind::Orphan => {
                if let Some(block) = seg.blocks.last() {
                    warn!(row = index, department = %block.department, "Row precedes any time-slot header; skipped");
                } else {
                    debug!(row = index, "Row outside any department block; skipped");
                }
            }
            RowKind::Blank | RowKind::Filler => {}
        }
        seg.kinds.push(kind);
    }

    if let Some(last) = seg.blocks.last() {
        if last.time_slots.is_empty() {
            warn!(department = %last.department, day = %last.day, "Department block has no time-slot header");
        }
    }
    seg
}

fn classify(row: &[String], current: Option<&Block>) -> RowKind {
    if row.is_empty() || is_blank(row) {
        return RowKind::Blank;
    }
    if let Some((department, day)) = department_header(row) {
        return RowKind::DepartmentHeader { department, day };
    }
    let Some(block) = current else {
        return RowKind::Orphan;
    };
    if block.time_slots.is_empty() {
        let slots = time_slots(row);
        return if slots.is_empty() {
            RowKind::Orphan
        } else {
            RowKind::TimeSlotHeader(slots)
        };
    }
    let label = row.first().map(String::as_str).unwrap_or_default();
    if FILLER.is_match(label.trim()) {
        return RowKind::Filler;
    }
    RowKind::RoomRow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_department_header_anchor() {
        assert_eq!(
            department_header(&row(&["Mathematics - Monday"])),
            Some(("Mathematics".to_string(), "Monday".to_string()))
        );
        assert_eq!(
            department_header(&row(&["CS & IT  TUESDAY", ""])),
            Some(("CS & IT".to_string(), "Tuesday".to_string()))
        );
        assert_eq!(department_header(&row(&["C-201", "Monday"])), None);
        assert_eq!(department_header(&row(&["Mathematics"])), None);
    }

    #[test]
    fn test_time_slots_are_compacted() {
        assert_eq!(
            time_slots(&row(&["", "08:00 - 09:00", "", "9:00-10:00"])),
            vec!["08:00-09:00", "9:00-10:00"]
        );
        assert!(time_slots(&row(&["08:00-09:00"])).is_empty());
    }

    #[test]
    fn test_time_range_only() {
        assert!(is_time_range_only(" 08:00 - 09:00 "));
        assert!(!is_time_range_only("Lab 08:00-09:00"));
    }

    #[test]
    fn test_decode_keeps_multiline_cells() {
        let grid = decode("a,\"b\nc\",d\n\ne,f\n").unwrap();
        assert_eq!(grid[0], row(&["a", "b\nc", "d"]));
        assert_eq!(grid.last().unwrap(), &row(&["e", "f"]));
    }

    #[test]
    fn test_segment_blocks() {
        let grid = vec![
            row(&["CS & IT - Monday", "", ""]),
            row(&["", "08:00-09:00", "09:00-10:00"]),
            row(&["Room/Labs", "", ""]),
            row(&["C-201", "OOP", ""]),
            row(&["", "", ""]),
            row(&["Mathematics - Monday"]),
        ];
        let seg = segment(&grid);
        assert_eq!(seg.blocks.len(), 2);
        let block = &seg.blocks[0];
        assert_eq!(block.time_slots, vec!["08:00-09:00", "09:00-10:00"]);
        assert_eq!(block.rows.len(), 1);
        assert_eq!(block.rows[0].label, "C-201");
        let cells: Vec<_> = block.slot_cells(&block.rows[0]).collect();
        assert_eq!(cells, vec![("08:00-09:00", "OOP"), ("09:00-10:00", "")]);
        assert!(seg.blocks[1].time_slots.is_empty());
        assert_eq!(seg.kinds[2], RowKind::Filler);
        assert_eq!(seg.kinds[4], RowKind::Blank);
    }

    #[test]
    fn test_row_before_slot_header_is_orphan() {
        let grid = vec![
            row(&["Physics - Friday"]),
            row(&["Lab 1", "Optics"]),
            row(&["", "10:00-11:00"]),
        ];
        let seg = segment(&grid);
        assert_eq!(seg.kinds[1], RowKind::Orphan);
        assert!(seg.blocks[0].rows.is_empty());
        assert_eq!(seg.blocks[0].time_slots, vec!["10:00-11:00"]);
    }
}
