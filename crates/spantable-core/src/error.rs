use thiserror::Error;

use crate::range::Axis;

/// Errors reported by table operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Row or column index beyond the current grid bounds
    #[error("{axis} index {index} out of range (0..{len})")]
    OutOfRange { axis: Axis, index: usize, len: usize },

    /// Operation not applicable to the current selection or cell
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Physical table and grid index disagree
    #[error("index inconsistency: {0}")]
    IndexInconsistency(String),

    /// Malformed host table description
    #[error("invalid layout: {0}")]
    Layout(String),
}

impl TableError {
    pub fn out_of_range(axis: Axis, index: usize, len: usize) -> Self {
        TableError::OutOfRange { axis, index, len }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        TableError::InvalidOperation(message.into())
    }

    pub fn inconsistency(message: impl Into<String>) -> Self {
        TableError::IndexInconsistency(message.into())
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::OutOfRange { .. } => "OUT_OF_RANGE",
            TableError::InvalidOperation(_) => "INVALID_OPERATION",
            TableError::IndexInconsistency(_) => "INDEX_INCONSISTENCY",
            TableError::Layout(_) => "INVALID_LAYOUT",
        }
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Layout(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
