use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{CellId, CellKind};
use crate::command::TableCommand;
use crate::error::{Result, TableError};
use crate::grid::GridIndex;
use crate::merge;
use crate::options::EditorOptions;
use crate::range::LogicalRect;
use crate::state::{PointerEvent, Selection, SelectionSession};
use crate::structure;
use crate::table::{Table, TableLayout};

/// Notification sent to update listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// The index was rebuilt after a mutation
    Updated { rows: usize, columns: usize },
    /// The selected rect changed or was cleared
    SelectionChanged { rect: Option<LogicalRect> },
}

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// A table together with its grid index and selection session.
///
/// Every mutating call rebuilds the index before it returns, so reads
/// always see the current table.
pub struct TableEditor {
    table: Table,
    grid: GridIndex,
    session: SelectionSession,
    options: EditorOptions,
    listeners: Vec<Listener>,
}

impl fmt::Debug for TableEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEditor")
            .field("table", &self.table)
            .field("session", &self.session)
            .field("options", &self.options)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TableEditor {
    pub fn new(table: Table) -> Self {
        Self::with_options(table, EditorOptions::default())
    }

    pub fn with_options(table: Table, options: EditorOptions) -> Self {
        let grid = GridIndex::build(&table);
        if let Err(err) = grid.verify_coverage() {
            tracing::warn!(%err, "initial table does not tile its grid");
        }
        Self {
            table,
            grid,
            session: SelectionSession::new(),
            options,
            listeners: Vec::new(),
        }
    }

    pub fn from_layout(layout: &TableLayout, options: EditorOptions) -> Self {
        Self::with_options(Table::from_layout(layout), options)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.session.selection()
    }

    /// Register a listener called after every rebuild and selection change
    pub fn on_update(&mut self, listener: impl FnMut(&EditorEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: EditorEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn rebuild(&mut self) {
        self.grid = GridIndex::build(&self.table);
        if let Err(err) = self.grid.verify_coverage() {
            tracing::warn!(%err, "table does not tile its grid after mutation");
        }

        let before = self.session.rect();
        self.session.refresh(&self.grid);

        self.emit(EditorEvent::Updated {
            rows: self.grid.row_count(),
            columns: self.grid.col_count(),
        });
        if self.session.rect() != before {
            let rect = self.session.rect();
            self.emit(EditorEvent::SelectionChanged { rect });
        }
    }

    fn clear_selection(&mut self) {
        if self.session.selection().is_some() {
            self.session.clear();
            self.emit(EditorEvent::SelectionChanged { rect: None });
        }
    }

    // Pointer input

    /// Feed one pointer event to the selection session
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<bool> {
        let changed = self.session.handle(event, &self.grid)?;
        if changed {
            let rect = self.session.rect();
            self.emit(EditorEvent::SelectionChanged { rect });
        }
        Ok(changed)
    }

    pub fn pointer_down(&mut self, target: CellId) -> Result<bool> {
        self.handle_pointer(PointerEvent::down(target))
    }

    pub fn pointer_move(&mut self, target: CellId) -> Result<bool> {
        self.handle_pointer(PointerEvent::moved(target))
    }

    pub fn pointer_up(&mut self) -> Result<bool> {
        self.handle_pointer(PointerEvent::up())
    }

    /// Select the span closure of `rect` directly, without a drag
    pub fn select_rect(&mut self, rect: LogicalRect) -> Result<LogicalRect> {
        let first = self.owner(rect.start_col, rect.start_row)?;
        let last = self.owner(rect.end_col, rect.end_row)?;
        self.session.pointer_down(first, &self.grid)?;
        self.session.pointer_move(last, &self.grid)?;
        self.session.pointer_up();

        let selected = self.session.rect().unwrap_or(rect);
        self.emit(EditorEvent::SelectionChanged {
            rect: Some(selected),
        });
        Ok(selected)
    }

    fn owner(&self, col: usize, row: usize) -> Result<CellId> {
        structure::owner_at(&self.grid, col, row)
    }

    // Selection queries

    /// Whether the cell is inside the current selection
    pub fn is_selected(&self, id: CellId) -> bool {
        self.session.is_selected(id, &self.grid)
    }

    /// Cells inside the current selection, row-major
    pub fn selected_cells(&self) -> Vec<CellId> {
        match self.session.rect() {
            Some(rect) => self.grid.cells_within(&rect),
            None => Vec::new(),
        }
    }

    /// Contents of the selected cells joined with the configured separator
    pub fn selected_text(&self) -> String {
        self.selected_cells()
            .into_iter()
            .filter_map(|id| self.table.cell(id))
            .map(|cell| cell.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.options.join_separator)
    }

    // Merge and split

    /// Merge the current selection into its top-left cell
    pub fn merge_selection(&mut self) -> Result<CellId> {
        let rect = self
            .session
            .rect()
            .ok_or_else(|| TableError::invalid("no active selection"))?;
        let outcome = merge::merge(
            &mut self.table,
            &self.grid,
            rect,
            &self.options.join_separator,
        )?;

        self.session.clear();
        self.rebuild();
        self.emit(EditorEvent::SelectionChanged { rect: None });
        Ok(outcome.survivor)
    }

    /// Split a spanning cell into unit cells
    pub fn split_cell(&mut self, id: CellId) -> Result<Vec<CellId>> {
        let created = merge::split(
            &mut self.table,
            &self.grid,
            id,
            &self.options.new_cell_content,
        )?;
        self.clear_selection();
        self.rebuild();
        Ok(created)
    }

    /// Split every spanning cell inside the current selection
    pub fn split_selection(&mut self) -> Result<Vec<CellId>> {
        let rect = self
            .session
            .rect()
            .ok_or_else(|| TableError::invalid("no active selection"))?;
        let created = merge::split_within(&mut self.table, rect, &self.options.new_cell_content)?;
        self.clear_selection();
        self.rebuild();
        Ok(created)
    }

    // Structure

    /// Insert a row at `position`, or append when `None`. Returns its index.
    pub fn insert_row(&mut self, kind: CellKind, position: Option<usize>) -> Result<usize> {
        let index = structure::insert_row(
            &mut self.table,
            &self.grid,
            kind,
            position,
            &self.options.new_cell_content,
        )?;
        self.rebuild();
        Ok(index)
    }

    pub fn remove_row(&mut self, row: usize) -> Result<Vec<CellId>> {
        let deleted = structure::remove_row(&mut self.table, &self.grid, row)?;
        self.rebuild();
        Ok(deleted)
    }

    /// Insert a column at `position`, or append when `None`
    pub fn insert_column(
        &mut self,
        kind: CellKind,
        position: Option<usize>,
    ) -> Result<Vec<CellId>> {
        let created = structure::insert_column(
            &mut self.table,
            &self.grid,
            kind,
            position,
            &self.options.new_cell_content,
        )?;
        self.rebuild();
        Ok(created)
    }

    pub fn remove_column(&mut self, col: usize) -> Result<Vec<CellId>> {
        let deleted = structure::remove_column(&mut self.table, &self.grid, col)?;
        self.rebuild();
        Ok(deleted)
    }

    pub fn change_cell_kind(&mut self, col: usize, row: usize, kind: CellKind) -> Result<CellId> {
        let id = structure::change_cell_kind(&mut self.table, &self.grid, col, row, kind)?;
        self.rebuild();
        Ok(id)
    }

    pub fn change_row_kind(&mut self, row: usize, kind: CellKind) -> Result<usize> {
        let changed = structure::change_row_kind(&mut self.table, &self.grid, row, kind)?;
        self.rebuild();
        Ok(changed)
    }

    pub fn change_column_kind(&mut self, col: usize, kind: CellKind) -> Result<usize> {
        let changed = structure::change_column_kind(&mut self.table, &self.grid, col, kind)?;
        self.rebuild();
        Ok(changed)
    }

    pub fn set_cell_content(
        &mut self,
        col: usize,
        row: usize,
        content: impl Into<String>,
    ) -> Result<CellId> {
        let id = structure::set_cell_content(&mut self.table, &self.grid, col, row, content)?;
        self.rebuild();
        Ok(id)
    }

    pub fn summary(&self) -> Option<&str> {
        self.table.summary()
    }

    /// Set the caption text; empty clears it
    pub fn set_summary(&mut self, summary: Option<String>) {
        self.table.set_summary(summary);
        self.rebuild();
    }

    /// Run a command
    pub fn execute(&mut self, command: TableCommand) -> Result<()> {
        tracing::debug!(
            command = command.description(),
            structural = command.is_structural(),
            "executing table command"
        );

        match command {
            TableCommand::MergeSelection => self.merge_selection().map(drop),
            TableCommand::SplitSelection => self.split_selection().map(drop),
            TableCommand::SplitCell { cell } => self.split_cell(cell).map(drop),
            TableCommand::InsertRow { kind, position } => self.insert_row(kind, position).map(drop),
            TableCommand::RemoveRow { row } => self.remove_row(row).map(drop),
            TableCommand::InsertColumn { kind, position } => {
                self.insert_column(kind, position).map(drop)
            }
            TableCommand::RemoveColumn { column } => self.remove_column(column).map(drop),
            TableCommand::ChangeCellKind { column, row, kind } => {
                self.change_cell_kind(column, row, kind).map(drop)
            }
            TableCommand::ChangeRowKind { row, kind } => self.change_row_kind(row, kind).map(drop),
            TableCommand::ChangeColumnKind { column, kind } => {
                self.change_column_kind(column, kind).map(drop)
            }
            TableCommand::SetCellContent {
                column,
                row,
                content,
            } => self.set_cell_content(column, row, content).map(drop),
            TableCommand::SetSummary { summary } => {
                self.set_summary(summary);
                Ok(())
            }
        }
    }
}
