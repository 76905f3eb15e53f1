use serde::{Deserialize, Serialize};

use crate::cell::{CellId, CellKind};
use crate::command::TableCommand;
use crate::range::{col_to_label, Axis};

/// Pointer event kinds delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event reduced to what the selection session needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Cell under the pointer, if any
    #[serde(default)]
    pub target: Option<CellId>,
}

impl PointerEvent {
    pub fn down(target: CellId) -> Self {
        Self {
            kind: PointerKind::Down,
            target: Some(target),
        }
    }

    pub fn moved(target: CellId) -> Self {
        Self {
            kind: PointerKind::Move,
            target: Some(target),
        }
    }

    pub fn up() -> Self {
        Self {
            kind: PointerKind::Up,
            target: None,
        }
    }
}

/// Entries of the row/column controller menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuItem {
    Delete,
    InsertHeaderBefore,
    InsertHeaderAfter,
    InsertBefore,
    InsertAfter,
    ConvertToHeader,
    ConvertToRegular,
}

impl MenuItem {
    /// Menu order
    pub const ALL: [MenuItem; 7] = [
        MenuItem::Delete,
        MenuItem::InsertHeaderBefore,
        MenuItem::InsertHeaderAfter,
        MenuItem::InsertBefore,
        MenuItem::InsertAfter,
        MenuItem::ConvertToHeader,
        MenuItem::ConvertToRegular,
    ];

    /// Menu text for a row or column controller
    pub fn label(&self, axis: Axis) -> String {
        let object = match axis {
            Axis::Row => "Row",
            Axis::Column => "Column",
        };
        match self {
            MenuItem::Delete => format!("Delete {object}"),
            MenuItem::InsertHeaderBefore => format!("Insert Header {object} Before"),
            MenuItem::InsertHeaderAfter => format!("Insert Header {object} After"),
            MenuItem::InsertBefore => format!("Insert {object} Before"),
            MenuItem::InsertAfter => format!("Insert {object} After"),
            MenuItem::ConvertToHeader => format!("Convert to header {axis}"),
            MenuItem::ConvertToRegular => format!("Convert to regular {axis}"),
        }
    }

    /// Command this entry issues for the controller at logical `index`
    pub fn command(&self, axis: Axis, index: usize) -> TableCommand {
        let insert = |kind: CellKind, position: usize| match axis {
            Axis::Row => TableCommand::InsertRow {
                kind,
                position: Some(position),
            },
            Axis::Column => TableCommand::InsertColumn {
                kind,
                position: Some(position),
            },
        };
        let convert = |kind: CellKind| match axis {
            Axis::Row => TableCommand::ChangeRowKind { row: index, kind },
            Axis::Column => TableCommand::ChangeColumnKind {
                column: index,
                kind,
            },
        };

        match self {
            MenuItem::Delete => match axis {
                Axis::Row => TableCommand::RemoveRow { row: index },
                Axis::Column => TableCommand::RemoveColumn { column: index },
            },
            MenuItem::InsertHeaderBefore => insert(CellKind::Header, index),
            MenuItem::InsertHeaderAfter => insert(CellKind::Header, index + 1),
            MenuItem::InsertBefore => insert(CellKind::Normal, index),
            MenuItem::InsertAfter => insert(CellKind::Normal, index + 1),
            MenuItem::ConvertToHeader => convert(CellKind::Header),
            MenuItem::ConvertToRegular => convert(CellKind::Normal),
        }
    }
}

/// Label shown on a controller tab: `A`, `B`, ... for columns, 1-based
/// numbers for rows
pub fn controller_label(axis: Axis, index: usize) -> String {
    match axis {
        Axis::Row => (index + 1).to_string(),
        Axis::Column => col_to_label(index),
    }
}
