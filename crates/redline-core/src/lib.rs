//! Redline Core - highlight extraction and versioned merge kernel
//!
//! This crate provides:
//! - The change model (`ChangeRecord`, closed `Action` enum) and snapshots
//! - `ColorRuleMap`: highlight color → action
//! - `ChangeExtractor`: source table → ordered change records (row or cell mode)
//! - `MergeEngine`: change records + base snapshot → next table state and change log
//! - `AuditHighlighter`: change log → per-cell markers and styles
//! - The error and logging facilities shared by the other crates

pub mod audit;
pub mod config;
pub mod errors;
pub mod extract;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod report;
pub mod rules;

// Re-export commonly used types
pub use audit::{AuditHighlighter, HighlightResult, MarkerCounts};
pub use config::{ExtractionMode, RedlineConfig};
pub use errors::{ErrorClass, ExError, ExErrorKind, RedlineError, Result};
pub use extract::{validate_wire_records, ChangeExtractor, WireChangeRecord};
pub use merge::{ChangeKind, ChangeLog, MergeEngine, MergeOutcome, RowOrigin};
pub use model::{Action, ChangeRecord, Snapshot, SourceCell, SourceTable, Target};
pub use report::{MergeStats, Notice, NoticeClass, RunReport};
pub use rules::ColorRuleMap;
