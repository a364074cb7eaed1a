//! Turning highlighted source tables (or pre-extracted lists) into change
//! records.

pub mod extractor;
pub mod wire;

pub use extractor::ChangeExtractor;
pub use wire::{validate_wire_records, WireChangeRecord};
