pub mod cell;
pub mod command;
pub mod editor;
pub mod error;
pub mod grid;
pub mod merge;
pub mod normalize;
pub mod options;
pub mod range;
pub mod resolver;
pub mod state;
pub mod structure;
pub mod table;

pub use cell::{CellId, CellKind, PhysicalCell};
pub use command::TableCommand;
pub use editor::{EditorEvent, TableEditor};
pub use error::{Result, TableError};
pub use grid::GridIndex;
pub use merge::MergeOutcome;
pub use normalize::{expansion, is_span_closed, normalize, Expansion};
pub use options::EditorOptions;
pub use range::{col_from_label, col_to_label, Axis, LogicalRect};
pub use state::{
    controller_label, MenuItem, PointerEvent, PointerKind, Selection, SelectionSession,
    SessionState,
};
pub use table::{CellLayout, Row, Section, Table, TableLayout};
