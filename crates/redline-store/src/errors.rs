//! Error handling for redline-store
//!
//! Wraps redline-core ExError with store-specific helpers

use redline_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation)
        .with_path(path)
        .with_message(err.to_string())
}

/// A required input file does not exist or cannot be read
pub fn input_missing(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::InputMissing)
        .with_op(operation)
        .with_path(path)
        .with_message(err.to_string())
}

/// Another run holds the chain lock
pub fn chain_locked(path: &Path, lock_file: &Path, run: &str, pid: Option<&str>) -> ExError {
    let holder = match pid {
        Some(pid) => format!("run {} (pid {})", run, pid),
        None => format!("run {}", run),
    };
    ExError::new(ExErrorKind::ChainLocked)
        .with_op("acquire_chain_lock")
        .with_path(path)
        .with_message(format!(
            "workbook is locked by {}; if that process is no longer running, remove {} and retry",
            holder,
            lock_file.display()
        ))
}

/// Workbook content is structurally invalid
pub fn persistence(operation: &str, path: &Path, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(operation)
        .with_path(path)
        .with_message(reason)
}

/// Input file content could not be parsed
pub fn invalid_input(operation: &str, path: &Path, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation)
        .with_path(path)
        .with_message(reason)
}

/// Serialization failure
pub fn serialization(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation)
        .with_message(err.to_string())
}
