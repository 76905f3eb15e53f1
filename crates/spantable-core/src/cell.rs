use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TableError;

/// Stable identity of a physical cell, assigned once by its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u64);

impl CellId {
    pub const fn new(raw: u64) -> Self {
        CellId(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell_{}", self.0)
    }
}

/// What a cell represents; decides header (`th`) vs data (`td`) markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    Header,
    #[default]
    Normal,
    Footer,
}

impl CellKind {
    /// Header and footer cells both render as header cells
    pub fn is_header_cell(&self) -> bool {
        matches!(self, CellKind::Header | CellKind::Footer)
    }

    /// Markup tag name for this kind
    pub fn tag(&self) -> &'static str {
        if self.is_header_cell() {
            "th"
        } else {
            "td"
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Header => "header",
            CellKind::Normal => "normal",
            CellKind::Footer => "footer",
        }
    }
}

impl FromStr for CellKind {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" | "th" => Ok(CellKind::Header),
            "normal" | "td" => Ok(CellKind::Normal),
            "footer" => Ok(CellKind::Footer),
            other => Err(TableError::invalid(format!("unknown cell kind `{other}`"))),
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of table markup: one `td`/`th` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalCell {
    id: CellId,
    pub kind: CellKind,
    pub content: String,
    rowspan: usize,
    colspan: usize,
}

impl PhysicalCell {
    /// Unit cell. Ids come from the owning table (see `Table::create_cell`).
    pub(crate) fn new(id: CellId, kind: CellKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            rowspan: 1,
            colspan: 1,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn rowspan(&self) -> usize {
        self.rowspan
    }

    pub fn colspan(&self) -> usize {
        self.colspan
    }

    /// Set the row span; zero is clamped to one
    pub fn set_rowspan(&mut self, rowspan: usize) {
        self.rowspan = rowspan.max(1);
    }

    /// Set the column span; zero is clamped to one
    pub fn set_colspan(&mut self, colspan: usize) {
        self.colspan = colspan.max(1);
    }

    /// Spans more than one logical position
    pub fn is_spanning(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("header".parse::<CellKind>().unwrap(), CellKind::Header);
        assert_eq!(" Normal ".parse::<CellKind>().unwrap(), CellKind::Normal);
        assert_eq!("footer".parse::<CellKind>().unwrap(), CellKind::Footer);
        assert_eq!("th".parse::<CellKind>().unwrap(), CellKind::Header);

        let err = "caption".parse::<CellKind>().unwrap_err();
        assert_eq!(err.code(), "INVALID_OPERATION");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(CellKind::Header.tag(), "th");
        assert_eq!(CellKind::Footer.tag(), "th");
        assert_eq!(CellKind::Normal.tag(), "td");
    }

    #[test]
    fn test_spans_clamp_to_one() {
        let mut cell = PhysicalCell::new(CellId::new(7), CellKind::Normal, "x");
        assert!(!cell.is_spanning());

        cell.set_colspan(0);
        assert_eq!(cell.colspan(), 1);

        cell.set_rowspan(3);
        assert!(cell.is_spanning());
        assert_eq!(cell.id().to_string(), "cell_7");
    }

    #[test]
    fn test_serialization() {
        let cell = PhysicalCell::new(CellId::new(3), CellKind::Header, "Name");
        let json = serde_json::to_string(&cell).unwrap();
        assert!(json.contains("\"kind\":\"header\""));

        let back: PhysicalCell = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cell);
    }
}
