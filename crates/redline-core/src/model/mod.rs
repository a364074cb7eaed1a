//! Domain model: change records, source tables and snapshots.

pub mod action;
pub mod change;
pub mod snapshot;
pub mod source;

pub use action::Action;
pub use change::{ChangeRecord, Target, ROW_TARGET};
pub use snapshot::{CellFormat, CellFormats, CellStyle, Marker, Row, SheetFormat, Snapshot};
pub use source::{SourceCell, SourceTable};
