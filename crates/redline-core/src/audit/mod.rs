//! Audit markers for a freshly merged snapshot.

pub mod highlighter;

pub use highlighter::{AuditHighlighter, HighlightResult, MarkerCounts};
