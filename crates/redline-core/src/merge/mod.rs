//! Applying change records to a base snapshot.

pub mod change_log;
pub mod engine;

pub use change_log::{ChangeKind, ChangeLog, RowOrigin};
pub use engine::{MergeEngine, MergeOutcome};
