//! Engine-level commands for I/O operations.

#![allow(clippy::result_large_err)]

use crate::commands::update::{load_changes, run_update, SourceKind, UpdateOutcome, UpdateRequest};
use redline_core::config::RedlineConfig;
use redline_core::errors::{ExError, ExErrorKind};
use redline_core::model::ChangeRecord;
use redline_core_types::RunContext;
use redline_store::errors::Result;
use std::path::PathBuf;

/// Engine-level commands that touch the filesystem.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Extract change records without touching any workbook.
    Preview { source: PathBuf, kind: SourceKind },
    /// Run the full pipeline against a destination workbook.
    Update(UpdateRequest),
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Preview(Vec<ChangeRecord>),
    Update(UpdateOutcome),
}

impl EngineCommandResult {
    fn label(&self) -> &'static str {
        match self {
            EngineCommandResult::Preview(_) => "preview",
            EngineCommandResult::Update(_) => "update",
        }
    }

    fn mismatch(&self, expected: &str) -> ExError {
        ExError::new(ExErrorKind::Internal)
            .with_op("apply_engine_command")
            .with_message(format!(
                "expected a {} result, got {}",
                expected,
                self.label()
            ))
    }

    /// # Errors
    ///
    /// `Internal` when the command was not a preview.
    pub fn into_preview(self) -> Result<Vec<ChangeRecord>> {
        match self {
            EngineCommandResult::Preview(records) => Ok(records),
            other => Err(other.mismatch("preview")),
        }
    }

    /// # Errors
    ///
    /// `Internal` when the command was not an update.
    pub fn into_update(self) -> Result<UpdateOutcome> {
        match self {
            EngineCommandResult::Update(outcome) => Ok(outcome),
            other => Err(other.mismatch("update")),
        }
    }
}

/// Apply an engine command.
///
/// # Errors
///
/// Whatever the underlying pipeline step returns.
pub fn apply_engine_command(
    cmd: EngineCommand,
    config: &RedlineConfig,
    ctx: &RunContext,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::Preview { source, kind } => {
            let records = load_changes(&source, kind, config)?;
            Ok(EngineCommandResult::Preview(records))
        }
        EngineCommand::Update(request) => {
            let outcome = run_update(&request, config, ctx)?;
            Ok(EngineCommandResult::Update(outcome))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::errors::ErrorClass;

    #[test]
    fn test_result_of_the_wrong_command_is_internal() {
        let err = EngineCommandResult::Preview(Vec::new())
            .into_update()
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::Internal);
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(err.message().contains("got preview"));
        assert!(EngineCommandResult::Preview(Vec::new()).into_preview().is_ok());
    }
}
