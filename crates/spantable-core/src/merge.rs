//! Merge and split of spanning cells.
//!
//! Both operations mutate the physical table only; the caller rebuilds the
//! grid index afterwards. Row positions for split are taken from the grid
//! index built before the mutation, never from rendered geometry.

use crate::cell::{CellId, PhysicalCell};
use crate::error::{Result, TableError};
use crate::grid::GridIndex;
use crate::normalize::normalize;
use crate::range::{Axis, LogicalRect};
use crate::table::Table;

/// Result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Top-left cell, now spanning `rect`
    pub survivor: CellId,
    pub removed: Vec<CellId>,
    pub rect: LogicalRect,
}

/// Merge every cell inside the span closure of `rect` into its top-left cell.
///
/// Contents are joined in row-major order with `separator`.
pub fn merge(
    table: &mut Table,
    grid: &GridIndex,
    rect: LogicalRect,
    separator: &str,
) -> Result<MergeOutcome> {
    let bounds = grid
        .bounds()
        .ok_or_else(|| TableError::invalid("cannot merge in an empty table"))?;
    if !bounds.contains_rect(&rect) {
        let (axis, index, len) = if rect.end_row > bounds.end_row {
            (Axis::Row, rect.end_row, grid.row_count())
        } else {
            (Axis::Column, rect.end_col, grid.col_count())
        };
        return Err(TableError::out_of_range(axis, index, len));
    }

    let rect = normalize(rect, grid);
    let collected = grid.cells_within(&rect);
    let (survivor, rest) = match collected.split_first() {
        Some((first, rest)) if !rest.is_empty() => (*first, rest.to_vec()),
        _ => return Err(TableError::invalid("cannot merge a single cell")),
    };

    let mut contents = Vec::with_capacity(collected.len());
    for id in &collected {
        match table.cell(*id) {
            Some(cell) => contents.push(cell.content.clone()),
            None => {
                tracing::warn!(%id, "merge skipped a cell missing from the table");
            }
        }
    }

    let mut removed = Vec::with_capacity(rest.len());
    for id in rest {
        if table.remove_cell(id).is_some() {
            removed.push(id);
        }
    }

    let cell = table
        .cell_mut(survivor)
        .ok_or_else(|| TableError::inconsistency(format!("{survivor} vanished during merge")))?;
    cell.content = contents.join(separator);
    cell.set_rowspan(rect.row_count());
    cell.set_colspan(rect.col_count());

    tracing::debug!(%rect, %survivor, removed = removed.len(), "merged cells");

    Ok(MergeOutcome {
        survivor,
        removed,
        rect,
    })
}

fn unit_cells(
    table: &mut Table,
    template: &PhysicalCell,
    count: usize,
    content: &str,
) -> Vec<PhysicalCell> {
    (0..count)
        .map(|_| table.create_cell(template.kind, content))
        .collect()
}

/// Split a spanning cell back into unit cells.
///
/// Returns the ids of the created cells. `content` fills the new cells.
pub fn split(
    table: &mut Table,
    grid: &GridIndex,
    id: CellId,
    content: &str,
) -> Result<Vec<CellId>> {
    let rect = grid.require_rect(id)?;
    if rect.is_single_cell() {
        return Err(TableError::invalid("cannot split a unit cell"));
    }

    let (row, ordinal) = table
        .locate(id)
        .ok_or_else(|| TableError::inconsistency(format!("{id} is not in the table")))?;
    let template = table.rows()[row].cells[ordinal].clone();
    let width = rect.col_count();
    let mut created = Vec::with_capacity(rect.cell_count() - 1);

    // Rows below first: the target's own row indices stay valid
    for below in rect.start_row + 1..=rect.end_row {
        let Some(index) = grid.insertion_ordinal(table, below, rect.start_col) else {
            tracing::warn!(%id, row = below, "split skipped a row missing from the table");
            continue;
        };
        let cells = unit_cells(table, &template, width, content);
        created.extend(cells.iter().map(PhysicalCell::id));
        if let Some(target_row) = table.row_mut(below) {
            target_row.cells.splice(index..index, cells);
        }
    }

    let right = unit_cells(table, &template, width - 1, content);
    created.extend(right.iter().map(PhysicalCell::id));
    if let Some(own_row) = table.row_mut(row) {
        own_row.cells.splice(ordinal + 1..ordinal + 1, right);
        let cell = &mut own_row.cells[ordinal];
        cell.set_rowspan(1);
        cell.set_colspan(1);
    }

    tracing::debug!(%id, %rect, created = created.len(), "split cell");
    Ok(created)
}

/// Split every spanning cell lying inside `rect`.
///
/// The index is rebuilt between splits since each one shifts physical
/// positions. Fails when nothing inside spans.
pub fn split_within(table: &mut Table, rect: LogicalRect, content: &str) -> Result<Vec<CellId>> {
    let grid = GridIndex::build(table);
    let targets: Vec<CellId> = grid
        .cells_within(&rect)
        .into_iter()
        .filter(|id| grid.rect(*id).is_some_and(|r| !r.is_single_cell()))
        .collect();

    if targets.is_empty() {
        return Err(TableError::invalid("cannot split a unit cell"));
    }

    let mut created = Vec::new();
    for id in targets {
        let grid = GridIndex::build(table);
        created.extend(split(table, &grid, id, content)?);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use crate::table::{CellLayout, TableLayout};

    fn uniform(rows: usize, cols: usize) -> (Table, GridIndex) {
        let table = Table::from_layout(&TableLayout::uniform(rows, cols));
        let grid = GridIndex::build(&table);
        (table, grid)
    }

    #[test]
    fn test_merge_block() {
        let (mut table, grid) = uniform(3, 3);
        let outcome = merge(&mut table, &grid, LogicalRect::new(0, 0, 1, 1), ",").unwrap();

        assert_eq!(outcome.removed.len(), 3);
        assert_eq!(table.cell_count(), 6);

        let cell = table.cell(outcome.survivor).unwrap();
        assert_eq!(cell.content, "A1,B1,A2,B2");
        assert_eq!((cell.rowspan(), cell.colspan()), (2, 2));

        let grid = GridIndex::build(&table);
        assert!(grid.verify_coverage().is_ok());
        assert_eq!(grid.rect(outcome.survivor), Some(LogicalRect::new(0, 0, 1, 1)));
    }

    #[test]
    fn test_merge_single_cell_fails() {
        let (mut table, grid) = uniform(2, 2);
        let err = merge(&mut table, &grid, LogicalRect::single(1, 1), ",").unwrap_err();
        assert_eq!(err, TableError::invalid("cannot merge a single cell"));
        assert_eq!(table.cell_count(), 4);
    }

    #[test]
    fn test_merge_lone_spanning_cell_fails() {
        let table_layout = TableLayout {
            body: vec![
                vec![CellLayout::text("A").span(2, 2)],
                vec![],
            ],
            ..TableLayout::default()
        };
        let mut table = Table::from_layout(&table_layout);
        let grid = GridIndex::build(&table);

        assert!(merge(&mut table, &grid, LogicalRect::new(0, 0, 1, 1), ",").is_err());
    }

    #[test]
    fn test_merge_out_of_bounds() {
        let (mut table, grid) = uniform(2, 2);
        let err = merge(&mut table, &grid, LogicalRect::new(0, 0, 0, 4), ",").unwrap_err();
        assert_eq!(err.code(), "OUT_OF_RANGE");
    }

    #[test]
    fn test_merge_expands_partial_rect() {
        let layout = TableLayout {
            body: vec![
                vec![
                    CellLayout::text("A").span(2, 1),
                    CellLayout::text("B"),
                    CellLayout::text("C"),
                ],
                vec![CellLayout::text("D"), CellLayout::text("E")],
            ],
            ..TableLayout::default()
        };
        let mut table = Table::from_layout(&layout);
        let grid = GridIndex::build(&table);

        let outcome = merge(&mut table, &grid, LogicalRect::new(0, 0, 0, 1), "|").unwrap();
        assert_eq!(outcome.rect, LogicalRect::new(0, 0, 1, 1));
        assert_eq!(table.cell(outcome.survivor).unwrap().content, "A|B|D");
    }

    #[test]
    fn test_split_block_restores_units() {
        let (mut table, grid) = uniform(3, 3);
        let outcome = merge(&mut table, &grid, LogicalRect::new(1, 1, 2, 2), ",").unwrap();

        let grid = GridIndex::build(&table);
        let created = split(&mut table, &grid, outcome.survivor, "").unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(table.cell_count(), 9);

        let grid = GridIndex::build(&table);
        assert!(grid.verify_coverage().is_ok());
        assert!(table.cells().all(|(_, _, c)| !c.is_spanning()));
        assert_eq!(grid.cell_at(1, 1), Some(outcome.survivor));
        for id in created {
            assert_eq!(table.cell(id).unwrap().content, "");
        }
    }

    #[test]
    fn test_split_with_unindexed_cell_below() {
        let (mut table, grid) = uniform(3, 3);
        let outcome = merge(&mut table, &grid, LogicalRect::new(0, 0, 1, 1), ",").unwrap();

        // Swap C2 for a fresh cell the index has never seen
        let grid = GridIndex::build(&table);
        let c2 = table.rows()[1].cells[0].id();
        table.remove_cell(c2).unwrap();
        let fresh = table.create_cell(CellKind::Normal, "C2");
        let fresh_id = fresh.id();
        table.row_mut(1).unwrap().cells.push(fresh);

        let created = split(&mut table, &grid, outcome.survivor, "").unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(table.rows()[1].cells[2].id(), fresh_id);

        let grid = GridIndex::build(&table);
        assert!(grid.verify_coverage().is_ok());
        assert_eq!(grid.cell_at(1, 2), Some(fresh_id));
    }

    #[test]
    fn test_split_tall_cell_in_first_column() {
        let layout = TableLayout {
            body: vec![
                vec![CellLayout::text("A").span(3, 1), CellLayout::text("B")],
                vec![CellLayout::text("C")],
                vec![CellLayout::text("D")],
            ],
            ..TableLayout::default()
        };
        let mut table = Table::from_layout(&layout);
        let a = table.rows()[0].cells[0].id();
        let grid = GridIndex::build(&table);

        split(&mut table, &grid, a, "").unwrap();

        // New cells land at index 0 of the rows below
        assert_eq!(table.rows()[1].cells[1].content, "C");
        assert_eq!(table.rows()[2].cells[1].content, "D");
        assert!(GridIndex::build(&table).verify_coverage().is_ok());
    }

    #[test]
    fn test_split_keeps_kind() {
        let layout = TableLayout {
            head: vec![vec![CellLayout::text("H").span(1, 3)]],
            body: vec![vec![CellLayout::text("a"), CellLayout::text("b"), CellLayout::text("c")]],
            ..TableLayout::default()
        };
        let mut table = Table::from_layout(&layout);
        let h = table.rows()[0].cells[0].id();
        let grid = GridIndex::build(&table);

        let created = split(&mut table, &grid, h, "").unwrap();
        assert_eq!(created.len(), 2);
        assert!(table.rows()[0].cells.iter().all(|c| c.kind.is_header_cell()));
    }

    #[test]
    fn test_split_unit_cell_fails() {
        let (mut table, grid) = uniform(2, 2);
        let id = table.rows()[0].cells[0].id();
        let err = split(&mut table, &grid, id, "").unwrap_err();
        assert_eq!(err, TableError::invalid("cannot split a unit cell"));
    }

    #[test]
    fn test_split_within_selection() {
        let layout = TableLayout {
            body: vec![
                vec![CellLayout::text("A").span(1, 2), CellLayout::text("B")],
                vec![CellLayout::text("C"), CellLayout::text("D").span(2, 2)],
                vec![CellLayout::text("E")],
            ],
            ..TableLayout::default()
        };
        let mut table = Table::from_layout(&layout);

        let created = split_within(&mut table, LogicalRect::new(0, 0, 2, 2), "").unwrap();
        assert_eq!(created.len(), 4);
        assert_eq!(table.cell_count(), 9);
        assert!(GridIndex::build(&table).verify_coverage().is_ok());

        let err = split_within(&mut table, LogicalRect::new(0, 0, 2, 2), "").unwrap_err();
        assert_eq!(err.code(), "INVALID_OPERATION");
    }
}
