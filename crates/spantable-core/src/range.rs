use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid axis, used by structural operations and range errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: usize) -> String {
    let mut label = String::new();
    let mut n = col + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
pub fn col_from_label(label: &str) -> Option<usize> {
    let mut col: usize = 0;

    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }

    col.checked_sub(1)
}

/// Parse a single A1 position into (row, col), both 0-indexed
fn parse_a1(notation: &str) -> Option<(usize, usize)> {
    let notation = notation.trim();
    let split = notation.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = notation.split_at(split);

    if letters.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let col = col_from_label(letters)?;
    let row: usize = digits.parse().ok()?;
    // Rows are 1-indexed in A1 notation
    Some((row.checked_sub(1)?, col))
}

/// Inclusive rectangle in logical grid coordinates.
///
/// Describes the positions a physical cell occupies, or the extent of a
/// selection. `start_*` is always the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalRect {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl LogicalRect {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        // Normalize so start is top-left and end is bottom-right
        LogicalRect {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    pub fn single(row: usize, col: usize) -> Self {
        LogicalRect::new(row, col, row, col)
    }

    /// Create from A1:B1 notation
    pub fn from_a1(notation: &str) -> Option<Self> {
        let parts: Vec<&str> = notation.split(':').collect();
        match parts.as_slice() {
            [one] => {
                let (row, col) = parse_a1(one)?;
                Some(LogicalRect::single(row, col))
            }
            [start, end] => {
                let (r1, c1) = parse_a1(start)?;
                let (r2, c2) = parse_a1(end)?;
                Some(LogicalRect::new(r1, c1, r2, c2))
            }
            _ => None,
        }
    }

    /// Convert to A1:B1 notation
    pub fn to_a1(&self) -> String {
        let start = format!("{}{}", col_to_label(self.start_col), self.start_row + 1);
        if self.is_single_cell() {
            start
        } else {
            format!(
                "{}:{}{}",
                start,
                col_to_label(self.end_col),
                self.end_row + 1
            )
        }
    }

    /// Check if a position is within this rect
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    /// Check if `other` lies entirely inside this rect
    pub fn contains_rect(&self, other: &LogicalRect) -> bool {
        other.start_row >= self.start_row
            && other.end_row <= self.end_row
            && other.start_col >= self.start_col
            && other.end_col <= self.end_col
    }

    /// Check if this rect intersects with another rect
    pub fn intersects(&self, other: &LogicalRect) -> bool {
        !(self.end_row < other.start_row
            || self.start_row > other.end_row
            || self.end_col < other.start_col
            || self.start_col > other.end_col)
    }

    /// Smallest rect containing both
    pub fn union(&self, other: &LogicalRect) -> LogicalRect {
        LogicalRect {
            start_row: self.start_row.min(other.start_row),
            start_col: self.start_col.min(other.start_col),
            end_row: self.end_row.max(other.end_row),
            end_col: self.end_col.max(other.end_col),
        }
    }

    /// Check if this rect is a single logical position
    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// Get the number of rows in the rect
    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Get the number of columns in the rect
    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Get the total number of positions in the rect
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    /// Iterate over all positions in the rect (row by row)
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        let rect = *self;
        (rect.start_row..=rect.end_row)
            .flat_map(move |row| (rect.start_col..=rect.end_col).map(move |col| (row, col)))
    }
}

impl fmt::Display for LogicalRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}
