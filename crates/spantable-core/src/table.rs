use serde::{Deserialize, Serialize};

use crate::cell::{CellId, CellKind, PhysicalCell};
use crate::range::col_to_label;

/// Table section a row belongs to (thead / tbody / tfoot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Header,
    Body,
    Footer,
}

impl Section {
    /// Kind given to cells created in this section when none is requested
    pub fn default_kind(&self) -> CellKind {
        match self {
            Section::Header => CellKind::Header,
            Section::Body => CellKind::Normal,
            Section::Footer => CellKind::Footer,
        }
    }
}

/// One physical row (`tr`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub section: Section,
    pub cells: Vec<PhysicalCell>,
}

impl Row {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            cells: Vec::new(),
        }
    }

    /// Sum of colspans in this row
    pub fn span_width(&self) -> usize {
        self.cells.iter().map(|c| c.colspan()).sum()
    }
}

/// Host description of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLayout {
    #[serde(default)]
    pub content: String,
    #[serde(default = "one")]
    pub rowspan: usize,
    #[serde(default = "one")]
    pub colspan: usize,
    /// Defaults to the section's kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CellKind>,
}

fn one() -> usize {
    1
}

impl CellLayout {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rowspan: 1,
            colspan: 1,
            kind: None,
        }
    }

    pub fn span(mut self, rowspan: usize, colspan: usize) -> Self {
        self.rowspan = rowspan;
        self.colspan = colspan;
        self
    }

    pub fn kind(mut self, kind: CellKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Host description of a table's initial structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub head: Vec<Vec<CellLayout>>,
    #[serde(default)]
    pub body: Vec<Vec<CellLayout>>,
    #[serde(default)]
    pub foot: Vec<Vec<CellLayout>>,
}

impl TableLayout {
    /// `rows` x `cols` body of unit cells labelled with their A1 position
    pub fn uniform(rows: usize, cols: usize) -> Self {
        let body = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| CellLayout::text(format!("{}{}", col_to_label(c), r + 1)))
                    .collect()
            })
            .collect();

        Self {
            body,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The physical table: rows of cells, the single source of truth.
///
/// Rows are kept in one list ordered header rows, then body rows, then
/// footer rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Row>,
    next_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a host layout. Zero spans are clamped to one.
    pub fn from_layout(layout: &TableLayout) -> Self {
        let mut table = Table::new();
        table.summary = layout.summary.clone();

        let sections = [
            (Section::Header, &layout.head),
            (Section::Body, &layout.body),
            (Section::Footer, &layout.foot),
        ];

        for (section, rows) in sections {
            for row_layout in rows {
                let mut row = Row::new(section);
                for cell_layout in row_layout {
                    let kind = cell_layout.kind.unwrap_or_else(|| section.default_kind());
                    let mut cell = table.create_cell(kind, cell_layout.content.clone());
                    cell.set_rowspan(cell_layout.rowspan);
                    cell.set_colspan(cell_layout.colspan);
                    row.cells.push(cell);
                }
                table.rows.push(row);
            }
        }

        table
    }

    /// Allocate a fresh unit cell; its id is never reused by this table
    pub fn create_cell(&mut self, kind: CellKind, content: impl Into<String>) -> PhysicalCell {
        let id = CellId::new(self.next_id);
        self.next_id += 1;
        PhysicalCell::new(id, kind, content)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of physical cells
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }

    /// All cells in document order with (row, ordinal) positions
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &PhysicalCell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.cells
                .iter()
                .enumerate()
                .map(move |(ordinal, cell)| (r, ordinal, cell))
        })
    }

    /// Physical (row, ordinal) of a cell
    pub fn locate(&self, id: CellId) -> Option<(usize, usize)> {
        self.cells()
            .find(|(_, _, cell)| cell.id() == id)
            .map(|(r, ordinal, _)| (r, ordinal))
    }

    pub fn cell(&self, id: CellId) -> Option<&PhysicalCell> {
        self.cells().find(|(_, _, cell)| cell.id() == id).map(|(_, _, c)| c)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut PhysicalCell> {
        self.cells_mut().find(|cell| cell.id() == id)
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut PhysicalCell> + '_ {
        self.rows.iter_mut().flat_map(|row| row.cells.iter_mut())
    }

    /// Remove a single cell from its row
    pub fn remove_cell(&mut self, id: CellId) -> Option<PhysicalCell> {
        let (r, ordinal) = self.locate(id)?;
        Some(self.rows[r].cells.remove(ordinal))
    }

    /// Insert a row at `index`. Callers keep the section ordering.
    pub(crate) fn insert_row(&mut self, index: usize, row: Row) {
        debug_assert!(self.section_order_holds_with(index, row.section));
        self.rows.insert(index, row);
    }

    pub(crate) fn remove_row(&mut self, index: usize) -> Option<Row> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Section of the row at `index`
    pub fn section_of(&self, index: usize) -> Option<Section> {
        self.rows.get(index).map(|r| r.section)
    }

    /// Number of rows in a section
    pub fn section_len(&self, section: Section) -> usize {
        self.rows.iter().filter(|r| r.section == section).count()
    }

    /// Spans-adjusted width of the first physical row
    pub fn first_row_width(&self) -> usize {
        self.rows.first().map(Row::span_width).unwrap_or(0)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: Option<String>) {
        self.summary = summary.filter(|s| !s.is_empty());
    }

    fn section_order_holds_with(&self, index: usize, section: Section) -> bool {
        let before_ok = index == 0 || self.rows[index - 1].section <= section;
        let after_ok = self.rows.get(index).map_or(true, |r| section <= r.section);
        before_ok && after_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        let table = Table::from_layout(&TableLayout::uniform(2, 3));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell_count(), 6);
        assert_eq!(table.first_row_width(), 3);

        let contents: Vec<_> = table.cells().map(|(_, _, c)| c.content.as_str()).collect();
        assert_eq!(contents, vec!["A1", "B1", "C1", "A2", "B2", "C2"]);
    }

    #[test]
    fn test_ids_are_unique_and_stable() {
        let mut table = Table::from_layout(&TableLayout::uniform(2, 2));
        let first = table.rows()[0].cells[0].id();
        let removed = table.remove_cell(first).unwrap();
        assert_eq!(removed.id(), first);

        let fresh = table.create_cell(CellKind::Normal, "");
        assert!(fresh.id() > first);
        assert!(table.cells().all(|(_, _, c)| c.id() != fresh.id()));
    }

    #[test]
    fn test_sections_and_default_kinds() {
        let layout = TableLayout {
            summary: Some("Totals".into()),
            head: vec![vec![CellLayout::text("Name"), CellLayout::text("Qty")]],
            body: vec![vec![CellLayout::text("a"), CellLayout::text("1")]],
            foot: vec![vec![CellLayout::text("Sum").span(1, 2)]],
        };
        let table = Table::from_layout(&layout);

        assert_eq!(table.section_of(0), Some(Section::Header));
        assert_eq!(table.section_of(1), Some(Section::Body));
        assert_eq!(table.section_of(2), Some(Section::Footer));
        assert_eq!(table.rows()[0].cells[0].kind, CellKind::Header);
        assert_eq!(table.rows()[1].cells[0].kind, CellKind::Normal);
        assert_eq!(table.rows()[2].cells[0].kind, CellKind::Footer);
        assert_eq!(table.rows()[2].cells[0].colspan(), 2);
        assert_eq!(table.summary(), Some("Totals"));
        assert_eq!(table.section_len(Section::Body), 1);
    }

    #[test]
    fn test_layout_json_defaults() {
        let json = r#"{ "body": [[{ "content": "x", "colspan": 2 }, {}]] }"#;
        let layout = TableLayout::from_json(json).unwrap();
        let cell = &layout.body[0][0];
        assert_eq!(cell.rowspan, 1);
        assert_eq!(cell.colspan, 2);
        assert_eq!(layout.body[0][1].content, "");
        assert!(layout.head.is_empty());
    }

    #[test]
    fn test_zero_span_clamped_on_import() {
        let layout = TableLayout {
            body: vec![vec![CellLayout::text("x").span(0, 0)]],
            ..TableLayout::default()
        };
        let table = Table::from_layout(&layout);
        let cell = &table.rows()[0].cells[0];
        assert_eq!((cell.rowspan(), cell.colspan()), (1, 1));
    }

    #[test]
    fn test_empty_summary_clears() {
        let mut table = Table::new();
        table.set_summary(Some(String::new()));
        assert_eq!(table.summary(), None);
    }
}
