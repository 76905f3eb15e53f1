pub mod input;
pub mod selection;

pub use input::{controller_label, MenuItem, PointerEvent, PointerKind};
pub use selection::{Selection, SelectionSession, SessionState};
