use serde::{Deserialize, Serialize};

use super::input::{PointerEvent, PointerKind};
use crate::cell::CellId;
use crate::error::Result;
use crate::grid::GridIndex;
use crate::normalize::normalize;
use crate::range::LogicalRect;

/// Pointer-drag state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Selecting,
}

/// The active selection: the drag endpoints and their span-closed rect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: CellId,
    pub cursor: CellId,
    pub rect: LogicalRect,
}

/// Drag-to-select state machine, one per editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSession {
    state: SessionState,
    selection: Option<Selection>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state == SessionState::Selecting
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn rect(&self) -> Option<LogicalRect> {
        self.selection.map(|s| s.rect)
    }

    /// Start a selection on `target`, replacing any previous one.
    ///
    /// An unknown cell leaves the session untouched.
    pub fn pointer_down(&mut self, target: CellId, grid: &GridIndex) -> Result<LogicalRect> {
        let rect = grid.require_rect(target)?;
        self.selection = Some(Selection {
            anchor: target,
            cursor: target,
            rect,
        });
        self.state = SessionState::Selecting;
        Ok(rect)
    }

    /// Extend the selection to `target`. Returns whether it changed.
    pub fn pointer_move(&mut self, target: CellId, grid: &GridIndex) -> Result<bool> {
        if self.state != SessionState::Selecting {
            return Ok(false);
        }
        let Some(current) = self.selection else {
            return Ok(false);
        };
        if current.cursor == target {
            return Ok(false);
        }

        let anchor = grid.require_rect(current.anchor)?;
        let cursor = grid.require_rect(target)?;
        let rect = normalize(anchor.union(&cursor), grid);

        self.selection = Some(Selection {
            cursor: target,
            rect,
            ..current
        });
        Ok(rect != current.rect)
    }

    /// End the drag. The selection stays.
    pub fn pointer_up(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Feed one host event. Returns whether the selection changed.
    pub fn handle(&mut self, event: PointerEvent, grid: &GridIndex) -> Result<bool> {
        match (event.kind, event.target) {
            (PointerKind::Down, Some(target)) => self.pointer_down(target, grid).map(|_| true),
            (PointerKind::Move, Some(target)) => self.pointer_move(target, grid),
            (PointerKind::Up, _) => {
                self.pointer_up();
                Ok(false)
            }
            (_, None) => Ok(false),
        }
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.state = SessionState::Idle;
    }

    /// Recompute the rect against a rebuilt index, dropping the selection
    /// if either endpoint no longer exists
    pub fn refresh(&mut self, grid: &GridIndex) {
        let Some(current) = self.selection else {
            return;
        };
        match (grid.rect(current.anchor), grid.rect(current.cursor)) {
            (Some(anchor), Some(cursor)) => {
                self.selection = Some(Selection {
                    rect: normalize(anchor.union(&cursor), grid),
                    ..current
                });
            }
            _ => self.clear(),
        }
    }

    /// Whether the cell lies inside the selected rect
    pub fn is_selected(&self, id: CellId, grid: &GridIndex) -> bool {
        match (self.rect(), grid.rect(id)) {
            (Some(selected), Some(cell)) => selected.contains_rect(&cell),
            _ => false,
        }
    }
}
