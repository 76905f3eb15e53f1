//! Coordinate resolution: physical cell -> logical rectangle.
//!
//! A cell's logical column cannot be read off its ordinal once any span
//! exists. Rows are resolved top to bottom; each row is walked left to right
//! skipping logical columns already claimed by row spans from above, so the
//! order used for a row is always the logical order of the rows before it.

use crate::cell::CellId;
use crate::range::LogicalRect;
use crate::table::{Row, Table};

/// Logical positions already claimed by resolved cells
#[derive(Debug, Default)]
struct Occupancy {
    rows: Vec<Vec<bool>>,
}

impl Occupancy {
    fn is_taken(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|cols| cols.get(col))
            .copied()
            .unwrap_or(false)
    }

    fn take(&mut self, rect: &LogicalRect) {
        if self.rows.len() <= rect.end_row {
            self.rows.resize_with(rect.end_row + 1, Vec::new);
        }
        for row in &mut self.rows[rect.start_row..=rect.end_row] {
            if row.len() <= rect.end_col {
                row.resize(rect.end_col + 1, false);
            }
            row[rect.start_col..=rect.end_col].fill(true);
        }
    }
}

/// Row-by-row resolver state
struct Sweep<'a> {
    table: &'a Table,
    total_columns: usize,
    occupancy: Occupancy,
}

impl<'a> Sweep<'a> {
    fn new(table: &'a Table, total_columns: usize) -> Self {
        Self {
            table,
            total_columns,
            occupancy: Occupancy::default(),
        }
    }

    /// Resolve every cell of one row, in ordinal order
    fn resolve_row(&mut self, row_index: usize, row: &Row) -> Vec<LogicalRect> {
        let last_row = self.table.row_count().saturating_sub(1);
        // No span reaches into or widens this row
        let unaffected = row.cells.len() == self.total_columns;
        let mut col = 0;

        row.cells
            .iter()
            .enumerate()
            .map(|(ordinal, cell)| {
                let start_col = if unaffected {
                    ordinal
                } else {
                    while self.occupancy.is_taken(row_index, col) {
                        col += 1;
                    }
                    col
                };

                // Row spans past the last row render as if they stopped there
                let end_row = (row_index + cell.rowspan() - 1).min(last_row.max(row_index));
                let rect = LogicalRect::new(
                    row_index,
                    start_col,
                    end_row,
                    start_col + cell.colspan() - 1,
                );

                self.occupancy.take(&rect);
                col = rect.end_col + 1;
                rect
            })
            .collect()
    }
}

/// Total logical columns: the spans-adjusted width of the first row
pub fn total_columns(table: &Table) -> usize {
    table.first_row_width()
}

/// Resolve the logical rect of every cell, in document order
pub fn resolve_all(table: &Table) -> Vec<(CellId, LogicalRect)> {
    let mut sweep = Sweep::new(table, total_columns(table));
    let mut resolved = Vec::with_capacity(table.cell_count());

    for (row_index, row) in table.rows().iter().enumerate() {
        let rects = sweep.resolve_row(row_index, row);
        resolved.extend(row.cells.iter().map(|c| c.id()).zip(rects));
    }

    resolved
}

/// Resolve a single cell. Rows below the cell's row are not visited.
pub fn resolve(table: &Table, id: CellId, total_columns: usize) -> Option<LogicalRect> {
    let (target_row, ordinal) = table.locate(id)?;
    let mut sweep = Sweep::new(table, total_columns);

    for (row_index, row) in table.rows().iter().enumerate().take(target_row + 1) {
        let rects = sweep.resolve_row(row_index, row);
        if row_index == target_row {
            return rects.get(ordinal).copied();
        }
    }

    None
}
