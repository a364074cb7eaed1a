use redline_core_types::{RunId, TraceId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using RedlineError
pub type Result<T> = std::result::Result<T, RedlineError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and the CLI's exit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExErrorKind {
    // Input
    InputMissing,
    InvalidInput,
    InvalidConfig,

    // Extraction
    KeyColumnMissing,
    MixedHighlightModes,
    InvalidChangeRecord,

    // Chain / persistence
    InvalidSheetName,
    DuplicateColumn,
    ChainLocked,
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

/// Pipeline-level classification of a fatal error.
///
/// Non-fatal conditions (no-op deletes, schema growth, blocked swaps) are
/// never errors; they travel in the run report as notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorClass {
    /// Source or destination absent/unreadable
    InputMissing,
    /// The source could not be turned into change records
    ExtractionError,
    /// Another run holds the chain
    Concurrency,
    /// Reading or writing the workbook failed
    Persistence,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InputMissing => "ERR_INPUT_MISSING",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::KeyColumnMissing => "ERR_KEY_COLUMN_MISSING",
            ExErrorKind::MixedHighlightModes => "ERR_MIXED_HIGHLIGHT_MODES",
            ExErrorKind::InvalidChangeRecord => "ERR_INVALID_CHANGE_RECORD",
            ExErrorKind::InvalidSheetName => "ERR_INVALID_SHEET_NAME",
            ExErrorKind::DuplicateColumn => "ERR_DUPLICATE_COLUMN",
            ExErrorKind::ChainLocked => "ERR_CHAIN_LOCKED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Map the kind onto the pipeline taxonomy
    pub fn class(&self) -> ErrorClass {
        match self {
            ExErrorKind::InputMissing | ExErrorKind::InvalidInput | ExErrorKind::InvalidConfig => {
                ErrorClass::InputMissing
            }
            ExErrorKind::KeyColumnMissing
            | ExErrorKind::MixedHighlightModes
            | ExErrorKind::InvalidChangeRecord
            | ExErrorKind::DuplicateColumn => ErrorClass::ExtractionError,
            ExErrorKind::ChainLocked => ErrorClass::Concurrency,
            ExErrorKind::InvalidSheetName
            | ExErrorKind::Io
            | ExErrorKind::Serialization
            | ExErrorKind::Persistence => ErrorClass::Persistence,
            ExErrorKind::Internal => ErrorClass::Internal,
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind plus optional context (operation, path, key, row) so that
/// callers can both branch on the kind and print a useful diagnostic.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<PathBuf>,
    key: Option<String>,
    row: Option<usize>,
    run_id: Option<RunId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            key: None,
            row: None,
            run_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the file path the operation was working on
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add the change-record key (Log_ID) involved
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add the 1-based source row number involved
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(row) = self.row {
            write!(f, " (row: {})", row)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the core operations (extraction, config, model)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RedlineError {
    /// The source header does not contain the configured key column
    #[error("Key column '{column}' not found in header {header:?}")]
    KeyColumnMissing { column: String, header: Vec<String> },

    /// A row carries highlights that belong to the other extraction mode
    #[error("Row {row} mixes row-level and cell-level highlights: {reason}")]
    MixedHighlightModes { row: usize, reason: String },

    /// A wire-shape change record failed validation
    #[error("Change record #{index} is invalid: {reason}")]
    InvalidChangeRecord {
        index: usize,
        /// Key of the record, when it could be read
        key: Option<String>,
        reason: String,
    },

    /// Action name outside {ADD_UPDATE, DELETE, NONE}
    #[error("Unknown action: {value}")]
    UnknownAction { value: String },

    /// Sheet name not of the form V<positive integer>
    #[error("Invalid snapshot sheet name: {name}")]
    InvalidSheetName { name: String },

    #[error("Duplicate column in header: {column}")]
    DuplicateColumn { column: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<RedlineError> for ExError {
    fn from(err: RedlineError) -> Self {
        match err {
            RedlineError::KeyColumnMissing { column, header } => {
                ExError::new(ExErrorKind::KeyColumnMissing)
                    .with_op("extract_changes")
                    .with_message(format!(
                        "Key column '{}' not found in header {:?}",
                        column, header
                    ))
            }
            RedlineError::MixedHighlightModes { row, reason } => {
                ExError::new(ExErrorKind::MixedHighlightModes)
                    .with_op("extract_changes")
                    .with_row(row)
                    .with_message(reason)
            }
            RedlineError::InvalidChangeRecord { index, key, reason } => {
                let err = ExError::new(ExErrorKind::InvalidChangeRecord)
                    .with_op("validate_change_records")
                    .with_row(index)
                    .with_message(reason);
                match key {
                    Some(key) => err.with_key(key),
                    None => err,
                }
            }
            RedlineError::UnknownAction { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_action")
                .with_message(format!("Unknown action: {}", value)),
            RedlineError::InvalidSheetName { name } => {
                ExError::new(ExErrorKind::InvalidSheetName)
                    .with_op("parse_sheet_name")
                    .with_message(format!("Invalid snapshot sheet name: {}", name))
            }
            RedlineError::DuplicateColumn { column } => {
                ExError::new(ExErrorKind::DuplicateColumn)
                    .with_message(format!("Duplicate column: {}", column))
            }
            RedlineError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig)
                    .with_op("load_config")
                    .with_message(reason)
            }
        }
    }
}

impl From<toml::de::Error> for RedlineError {
    fn from(err: toml::de::Error) -> Self {
        RedlineError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
