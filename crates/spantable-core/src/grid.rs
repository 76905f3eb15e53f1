use std::collections::HashMap;

use crate::cell::CellId;
use crate::error::{Result, TableError};
use crate::range::LogicalRect;
use crate::resolver;
use crate::table::Table;

/// Derived mapping from physical cells to logical rects.
///
/// Never patched in place: any structural change to the table is followed
/// by a full [`GridIndex::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridIndex {
    /// Cell ids in document order (row-major)
    order: Vec<CellId>,
    rects: HashMap<CellId, LogicalRect>,
    /// Physical (row, ordinal) of each cell
    positions: HashMap<CellId, (usize, usize)>,
    /// Dense row-major owner map, `row_count * col_count` entries
    owners: Vec<Option<CellId>>,
    row_count: usize,
    col_count: usize,
    overlaps: Vec<(usize, usize)>,
    out_of_bounds: Vec<CellId>,
}

impl GridIndex {
    /// Resolve every cell of `table` and index the result
    pub fn build(table: &Table) -> Self {
        let row_count = table.row_count();
        let col_count = resolver::total_columns(table);
        let resolved = resolver::resolve_all(table);

        let mut index = GridIndex {
            order: Vec::with_capacity(resolved.len()),
            rects: HashMap::with_capacity(resolved.len()),
            positions: table.cells().map(|(r, o, c)| (c.id(), (r, o))).collect(),
            owners: vec![None; row_count * col_count],
            row_count,
            col_count,
            overlaps: Vec::new(),
            out_of_bounds: Vec::new(),
        };

        for (id, rect) in resolved {
            index.order.push(id);
            index.rects.insert(id, rect);

            if rect.end_col >= col_count || rect.end_row >= row_count {
                index.out_of_bounds.push(id);
            }

            for (row, col) in rect.positions() {
                if row >= row_count || col >= col_count {
                    continue;
                }
                let slot = &mut index.owners[row * col_count + col];
                if slot.is_some() {
                    index.overlaps.push((row, col));
                }
                *slot = Some(id);
            }
        }

        if !index.overlaps.is_empty() || !index.out_of_bounds.is_empty() {
            tracing::warn!(
                overlaps = index.overlaps.len(),
                out_of_bounds = index.out_of_bounds.len(),
                "grid index built from an inconsistent table"
            );
        }
        tracing::debug!(
            rows = row_count,
            cols = col_count,
            cells = index.order.len(),
            "grid index rebuilt"
        );

        index
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// Number of indexed cells
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rect covering the whole grid, if it has any positions
    pub fn bounds(&self) -> Option<LogicalRect> {
        (self.row_count > 0 && self.col_count > 0)
            .then(|| LogicalRect::new(0, 0, self.row_count - 1, self.col_count - 1))
    }

    pub fn rect(&self, id: CellId) -> Option<LogicalRect> {
        self.rects.get(&id).copied()
    }

    /// Rect of a cell, or an inconsistency error naming it
    pub fn require_rect(&self, id: CellId) -> Result<LogicalRect> {
        self.rect(id)
            .ok_or_else(|| TableError::inconsistency(format!("{id} is not in the grid index")))
    }

    /// Physical (row, ordinal) of a cell at build time
    pub fn position(&self, id: CellId) -> Option<(usize, usize)> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.rects.contains_key(&id)
    }

    /// All cells with their rects, in document order
    pub fn cells(&self) -> impl Iterator<Item = (CellId, LogicalRect)> + '_ {
        self.order.iter().map(move |id| (*id, self.rects[id]))
    }

    /// Cell covering a logical position
    pub fn cell_at(&self, row: usize, col: usize) -> Option<CellId> {
        if row >= self.row_count || col >= self.col_count {
            return None;
        }
        self.owners[row * self.col_count + col]
    }

    /// Cells covering logical row `row`, left to right
    pub fn row_cells(&self, row: usize) -> Vec<CellId> {
        let mut cells: Vec<_> = self
            .cells()
            .filter(|(_, rect)| rect.start_row <= row && row <= rect.end_row)
            .collect();
        cells.sort_by_key(|(_, rect)| rect.start_col);
        cells.into_iter().map(|(id, _)| id).collect()
    }

    /// Cells covering logical column `col`, top to bottom
    pub fn column_cells(&self, col: usize) -> Vec<CellId> {
        self.cells()
            .filter(|(_, rect)| rect.start_col <= col && col <= rect.end_col)
            .map(|(id, _)| id)
            .collect()
    }

    /// Cells lying entirely inside `rect`, in row-major order
    pub fn cells_within(&self, rect: &LogicalRect) -> Vec<CellId> {
        self.cells()
            .filter(|(_, cell)| rect.contains_rect(cell))
            .map(|(id, _)| id)
            .collect()
    }

    /// Ordinal in physical row `row` at which a cell starting at logical
    /// column `col` belongs: the number of that row's cells starting left
    /// of `col`. Cells missing from the index are skipped.
    pub fn insertion_ordinal(&self, table: &Table, row: usize, col: usize) -> Option<usize> {
        let cells = &table.row(row)?.cells;
        let count = cells
            .iter()
            .filter(|cell| match self.rect(cell.id()) {
                Some(rect) => rect.start_col < col,
                None => {
                    tracing::warn!(id = %cell.id(), row, "cell missing from grid index, skipped");
                    false
                }
            })
            .count();
        Some(count)
    }

    /// Check that the cells tile the R x C grid: no gaps, no overlaps,
    /// nothing outside the grid
    pub fn verify_coverage(&self) -> Result<()> {
        if let Some(id) = self.out_of_bounds.first() {
            return Err(TableError::inconsistency(format!(
                "{id} extends outside the {}x{} grid",
                self.row_count, self.col_count
            )));
        }
        if let Some((row, col)) = self.overlaps.first() {
            return Err(TableError::inconsistency(format!(
                "position ({row}, {col}) is covered by more than one cell"
            )));
        }
        if let Some(slot) = self.owners.iter().position(Option::is_none) {
            return Err(TableError::inconsistency(format!(
                "position ({}, {}) is not covered by any cell",
                slot / self.col_count,
                slot % self.col_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use crate::table::{CellLayout, TableLayout};

    fn spanning_table() -> Table {
        // A spans rows 0-2 in column 0
        Table::from_layout(&TableLayout {
            body: vec![
                vec![
                    CellLayout::text("A").span(3, 1),
                    CellLayout::text("B"),
                    CellLayout::text("C"),
                ],
                vec![CellLayout::text("D"), CellLayout::text("E")],
                vec![CellLayout::text("F"), CellLayout::text("G")],
            ],
            ..TableLayout::default()
        })
    }

    #[test]
    fn test_build_uniform() {
        let table = Table::from_layout(&TableLayout::uniform(3, 4));
        let grid = GridIndex::build(&table);

        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.col_count(), 4);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.bounds(), Some(LogicalRect::new(0, 0, 2, 3)));
        assert!(grid.verify_coverage().is_ok());
    }

    #[test]
    fn test_reverse_lookups() {
        let table = spanning_table();
        let grid = GridIndex::build(&table);
        let a = table.rows()[0].cells[0].id();
        let e = table.rows()[1].cells[1].id();

        assert_eq!(grid.cell_at(2, 0), Some(a));
        assert_eq!(grid.cell_at(1, 2), Some(e));
        assert_eq!(grid.cell_at(3, 0), None);

        assert_eq!(grid.row_cells(1).len(), 3);
        assert_eq!(grid.row_cells(1)[0], a);
        assert_eq!(grid.column_cells(0), vec![a]);
        assert_eq!(grid.column_cells(2).len(), 3);
        assert_eq!(grid.position(e), Some((1, 1)));
    }

    #[test]
    fn test_cells_within() {
        let table = spanning_table();
        let grid = GridIndex::build(&table);

        // Rows 0-1 only clip A, which therefore is not inside
        let inside = grid.cells_within(&LogicalRect::new(0, 0, 1, 2));
        assert_eq!(inside.len(), 4);
        assert!(!inside.contains(&table.rows()[0].cells[0].id()));
    }

    #[test]
    fn test_detects_overlap() {
        // Row 1 claims three cells although A reaches into it
        let table = Table::from_layout(&TableLayout {
            body: vec![
                vec![CellLayout::text("A").span(2, 1), CellLayout::text("B")],
                vec![CellLayout::text("C"), CellLayout::text("D")],
            ],
            ..TableLayout::default()
        });
        let grid = GridIndex::build(&table);

        // Fast path places C on top of A
        let err = grid.verify_coverage().unwrap_err();
        assert_eq!(err.code(), "INDEX_INCONSISTENCY");
    }

    #[test]
    fn test_detects_gap() {
        let table = Table::from_layout(&TableLayout {
            body: vec![
                vec![CellLayout::text("A"), CellLayout::text("B")],
                vec![CellLayout::text("C")],
            ],
            ..TableLayout::default()
        });
        let grid = GridIndex::build(&table);
        let err = grid.verify_coverage().unwrap_err();
        assert!(err.to_string().contains("(1, 1)"));
    }

    #[test]
    fn test_insertion_ordinal() {
        let table = spanning_table();
        let grid = GridIndex::build(&table);

        // Row 1 holds D at column 1 and E at column 2
        assert_eq!(grid.insertion_ordinal(&table, 1, 0), Some(0));
        assert_eq!(grid.insertion_ordinal(&table, 1, 2), Some(1));
        assert_eq!(grid.insertion_ordinal(&table, 1, 3), Some(2));
        assert_eq!(grid.insertion_ordinal(&table, 5, 0), None);
    }

    #[test]
    fn test_insertion_ordinal_skips_unindexed_cells() {
        let mut table = spanning_table();
        let grid = GridIndex::build(&table);

        // Added after the index was built, so it has no rect
        let stray = table.create_cell(CellKind::Normal, "");
        let stray_id = stray.id();
        table.row_mut(1).unwrap().cells.insert(0, stray);
        assert!(!grid.contains(stray_id));

        assert_eq!(grid.insertion_ordinal(&table, 1, 2), Some(1));
        assert_eq!(grid.insertion_ordinal(&table, 1, 3), Some(2));
    }

    #[test]
    fn test_require_rect_unknown() {
        let grid = GridIndex::build(&Table::new());
        assert!(grid.is_empty());
        assert!(grid.bounds().is_none());
        assert!(grid.require_rect(CellId::new(1)).is_err());
    }
}
