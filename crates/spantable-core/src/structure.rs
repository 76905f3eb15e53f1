//! Row and column insertion and removal, kind changes and cell content.
//!
//! Every function takes the grid index built from the table as it is before
//! the call and leaves the table tiling its grid. The caller rebuilds the
//! index afterwards.

use crate::cell::{CellId, CellKind, PhysicalCell};
use crate::error::{Result, TableError};
use crate::grid::GridIndex;
use crate::range::Axis;
use crate::table::{Row, Section, Table};

/// Section a row inserted at `position` joins. First matching rule wins.
pub fn place_row(table: &Table, kind: CellKind, position: usize) -> Section {
    let header = kind.is_header_cell();
    let prev = position.checked_sub(1).and_then(|i| table.section_of(i));
    let next = table.section_of(position);

    match (prev, next) {
        // Before a header row
        (_, Some(Section::Header)) => Section::Header,
        // Header row right after the header section
        (Some(Section::Header), Some(_)) if header => Section::Header,
        // After a footer row
        (Some(Section::Footer), _) => Section::Footer,
        // Header row right before the footer section
        (_, Some(Section::Footer)) if header => Section::Footer,
        // First row
        (None, _) if header => Section::Header,
        // Appended
        (_, None) if header => Section::Footer,
        _ => Section::Body,
    }
}

/// Physical row spans reaching past the last row are cut to what the grid
/// shows, so that a row added below does not collide with them.
fn fit_row_spans(table: &mut Table, grid: &GridIndex) {
    for cell in table.cells_mut() {
        if let Some(rect) = grid.rect(cell.id()) {
            if cell.rowspan() > rect.row_count() {
                cell.set_rowspan(rect.row_count());
            }
        }
    }
}

fn mark(flags: &mut [bool], start: usize, end: usize) {
    for flag in flags.iter_mut().take(end + 1).skip(start) {
        *flag = true;
    }
}

/// Insert a row at `position` (appended when `None`) and return its index.
///
/// Cells whose row span straddles the insertion boundary grow by one row;
/// the new row gets a unit cell for every other logical column.
pub fn insert_row(
    table: &mut Table,
    grid: &GridIndex,
    kind: CellKind,
    position: Option<usize>,
    content: &str,
) -> Result<usize> {
    let rows = table.row_count();
    let position = position.unwrap_or(rows);
    if position > rows {
        return Err(TableError::out_of_range(Axis::Row, position, rows + 1));
    }

    fit_row_spans(table, grid);

    let mut covered = vec![false; grid.col_count()];
    for (id, rect) in grid.cells() {
        if rect.start_row < position && position <= rect.end_row {
            if let Some(cell) = table.cell_mut(id) {
                cell.set_rowspan(rect.row_count() + 1);
            }
            mark(&mut covered, rect.start_col, rect.end_col);
        }
    }

    let section = place_row(table, kind, position);
    let mut row = Row::new(section);
    for _ in covered.iter().filter(|taken| !**taken) {
        row.cells.push(table.create_cell(kind, content));
    }

    tracing::debug!(position, ?section, cells = row.cells.len(), "inserted row");
    table.insert_row(position, row);
    Ok(position)
}

/// Remove physical row `row`, returning the ids of the cells deleted with it.
///
/// Cells from above that reach into the row lose one row of span. A
/// spanning cell starting in the row and continuing below moves down into
/// the next row, one row shorter.
pub fn remove_row(table: &mut Table, grid: &GridIndex, row: usize) -> Result<Vec<CellId>> {
    let rows = table.row_count();
    if row >= rows {
        return Err(TableError::out_of_range(Axis::Row, row, rows));
    }

    let mut carried = Vec::new();
    for (id, rect) in grid.cells() {
        if rect.start_row < row && row <= rect.end_row {
            if let Some(cell) = table.cell_mut(id) {
                cell.set_rowspan(rect.row_count() - 1);
            }
        } else if rect.start_row == row && rect.end_row > row {
            carried.push((id, rect));
        }
    }

    let removed = table
        .remove_row(row)
        .ok_or_else(|| TableError::inconsistency(format!("row {row} vanished during removal")))?;

    let mut deleted = Vec::new();
    let mut moved: Vec<(usize, PhysicalCell)> = Vec::new();
    for mut cell in removed.cells {
        match carried.iter().find(|(id, _)| *id == cell.id()) {
            Some((_, rect)) => {
                cell.set_rowspan(rect.row_count() - 1);
                moved.push((rect.start_col, cell));
            }
            None => deleted.push(cell.id()),
        }
    }

    if !moved.is_empty() {
        let Some(next) = table.row_mut(row) else {
            return Err(TableError::inconsistency(format!(
                "cells of row {row} span below the last row"
            )));
        };
        let existing = std::mem::take(&mut next.cells);
        let mut merged: Vec<(usize, PhysicalCell)> = existing
            .into_iter()
            .map(|cell| {
                let col = grid.rect(cell.id()).map_or(usize::MAX, |r| r.start_col);
                (col, cell)
            })
            .chain(moved)
            .collect();
        merged.sort_by_key(|(col, _)| *col);
        next.cells = merged.into_iter().map(|(_, cell)| cell).collect();
    }

    tracing::debug!(row, deleted = deleted.len(), "removed row");
    Ok(deleted)
}

/// Insert a logical column at `position` (appended when `None`) and return
/// the ids of the created cells.
///
/// Cells whose column span straddles the boundary grow by one column. Rows
/// in the header and footer sections always get header cells.
pub fn insert_column(
    table: &mut Table,
    grid: &GridIndex,
    kind: CellKind,
    position: Option<usize>,
    content: &str,
) -> Result<Vec<CellId>> {
    let cols = grid.col_count();
    let position = position.unwrap_or(cols);
    if position > cols {
        return Err(TableError::out_of_range(Axis::Column, position, cols + 1));
    }

    let mut covered = vec![false; table.row_count()];
    for (id, rect) in grid.cells() {
        if rect.start_col < position && position <= rect.end_col {
            if let Some(cell) = table.cell_mut(id) {
                cell.set_colspan(rect.col_count() + 1);
            }
            mark(&mut covered, rect.start_row, rect.end_row);
        }
    }

    let mut created = Vec::new();
    for (row, taken) in covered.into_iter().enumerate() {
        if taken {
            continue;
        }
        let Some(ordinal) = grid.insertion_ordinal(table, row, position) else {
            tracing::warn!(row, "column insert skipped a row missing from the table");
            continue;
        };
        let cell_kind = match table.section_of(row) {
            Some(Section::Header | Section::Footer) => CellKind::Header,
            Some(Section::Body) | None => kind,
        };
        let cell = table.create_cell(cell_kind, content);
        created.push(cell.id());
        if let Some(target) = table.row_mut(row) {
            target.cells.insert(ordinal, cell);
        }
    }

    tracing::debug!(position, created = created.len(), "inserted column");
    Ok(created)
}

/// Remove logical column `col`, returning the ids of the deleted cells.
///
/// One-column cells covering it are deleted, wider ones shrink. Rows left
/// without any cell are removed as well.
pub fn remove_column(table: &mut Table, grid: &GridIndex, col: usize) -> Result<Vec<CellId>> {
    let cols = grid.col_count();
    if col >= cols {
        return Err(TableError::out_of_range(Axis::Column, col, cols));
    }

    let populated: Vec<bool> = table.rows().iter().map(|r| !r.cells.is_empty()).collect();

    let mut deleted = Vec::new();
    for id in grid.column_cells(col) {
        let rect = grid.require_rect(id)?;
        if rect.col_count() == 1 {
            if table.remove_cell(id).is_some() {
                deleted.push(id);
            }
        } else if let Some(cell) = table.cell_mut(id) {
            cell.set_colspan(rect.col_count() - 1);
        }
    }

    let emptied: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(i, row)| row.cells.is_empty() && populated.get(*i).copied().unwrap_or(false))
        .map(|(i, _)| i)
        .collect();

    // Bottom up so the remaining indices stay valid
    for row in emptied.into_iter().rev() {
        let grid = GridIndex::build(table);
        deleted.extend(remove_row(table, &grid, row)?);
    }

    tracing::debug!(col, deleted = deleted.len(), "removed column");
    Ok(deleted)
}

/// Cell covering the logical position, with per-axis range errors
pub fn owner_at(grid: &GridIndex, col: usize, row: usize) -> Result<CellId> {
    if row >= grid.row_count() {
        return Err(TableError::out_of_range(Axis::Row, row, grid.row_count()));
    }
    if col >= grid.col_count() {
        return Err(TableError::out_of_range(Axis::Column, col, grid.col_count()));
    }
    grid.cell_at(row, col)
        .ok_or_else(|| TableError::inconsistency(format!("no cell covers ({row}, {col})")))
}

fn cell_mut(table: &mut Table, id: CellId) -> Result<&mut PhysicalCell> {
    table
        .cell_mut(id)
        .ok_or_else(|| TableError::inconsistency(format!("{id} is not in the table")))
}

/// Change the kind of the cell covering logical (`col`, `row`). Content is kept.
pub fn change_cell_kind(
    table: &mut Table,
    grid: &GridIndex,
    col: usize,
    row: usize,
    kind: CellKind,
) -> Result<CellId> {
    let id = owner_at(grid, col, row)?;
    cell_mut(table, id)?.kind = kind;
    Ok(id)
}

/// Change the kind of every cell covering logical row `row`
pub fn change_row_kind(
    table: &mut Table,
    grid: &GridIndex,
    row: usize,
    kind: CellKind,
) -> Result<usize> {
    if row >= grid.row_count() {
        return Err(TableError::out_of_range(Axis::Row, row, grid.row_count()));
    }
    let cells = grid.row_cells(row);
    for id in &cells {
        cell_mut(table, *id)?.kind = kind;
    }
    Ok(cells.len())
}

/// Change the kind of every cell covering logical column `col`
pub fn change_column_kind(
    table: &mut Table,
    grid: &GridIndex,
    col: usize,
    kind: CellKind,
) -> Result<usize> {
    if col >= grid.col_count() {
        return Err(TableError::out_of_range(Axis::Column, col, grid.col_count()));
    }
    let cells = grid.column_cells(col);
    for id in &cells {
        cell_mut(table, *id)?.kind = kind;
    }
    Ok(cells.len())
}

/// Replace the content of the cell covering logical (`col`, `row`)
pub fn set_cell_content(
    table: &mut Table,
    grid: &GridIndex,
    col: usize,
    row: usize,
    content: impl Into<String>,
) -> Result<CellId> {
    let id = owner_at(grid, col, row)?;
    cell_mut(table, id)?.content = content.into();
    Ok(id)
}
