use serde::{Deserialize, Serialize};

use crate::cell::{CellId, CellKind};

/// Every editing request the table accepts, dispatched by
/// [`TableEditor::execute`](crate::editor::TableEditor::execute).
///
/// Row and column indices are logical grid coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableCommand {
    MergeSelection,
    SplitSelection,
    SplitCell {
        cell: CellId,
    },
    InsertRow {
        #[serde(default)]
        kind: CellKind,
        #[serde(default)]
        position: Option<usize>,
    },
    RemoveRow {
        row: usize,
    },
    InsertColumn {
        #[serde(default)]
        kind: CellKind,
        #[serde(default)]
        position: Option<usize>,
    },
    RemoveColumn {
        column: usize,
    },
    ChangeCellKind {
        column: usize,
        row: usize,
        kind: CellKind,
    },
    ChangeRowKind {
        row: usize,
        kind: CellKind,
    },
    ChangeColumnKind {
        column: usize,
        kind: CellKind,
    },
    SetCellContent {
        column: usize,
        row: usize,
        content: String,
    },
    SetSummary {
        #[serde(default)]
        summary: Option<String>,
    },
}

impl TableCommand {
    /// Get a description of this command (for UI display)
    pub fn description(&self) -> &'static str {
        match self {
            TableCommand::MergeSelection => "Merge selected cells",
            TableCommand::SplitSelection => "Split selected cells",
            TableCommand::SplitCell { .. } => "Split cell",
            TableCommand::InsertRow { .. } => "Insert row",
            TableCommand::RemoveRow { .. } => "Delete row",
            TableCommand::InsertColumn { .. } => "Insert column",
            TableCommand::RemoveColumn { .. } => "Delete column",
            TableCommand::ChangeCellKind { .. } => "Change cell kind",
            TableCommand::ChangeRowKind { .. } => "Change row kind",
            TableCommand::ChangeColumnKind { .. } => "Change column kind",
            TableCommand::SetCellContent { .. } => "Set cell content",
            TableCommand::SetSummary { .. } => "Set summary",
        }
    }

    /// Whether the command changes the set of cells or their spans
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            TableCommand::ChangeCellKind { .. }
                | TableCommand::ChangeRowKind { .. }
                | TableCommand::ChangeColumnKind { .. }
                | TableCommand::SetCellContent { .. }
                | TableCommand::SetSummary { .. }
        )
    }
}
