//! The `VersionStore` seam between the pipeline and persistence.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use chrono::Utc;
use redline_core::model::snapshot::DEFAULT_COLUMN_WIDTH;
use redline_core::model::{CellFormats, Row, SheetFormat, Snapshot};
use std::path::PathBuf;

/// Table state produced by merge + highlight, not yet versioned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDraft {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Parallel to `rows`
    pub cell_formats: Vec<CellFormats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainOptions {
    /// Width for columns with no carried-forward width
    pub default_column_width: f64,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            default_column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitStatus {
    /// Canonical location now holds the new chain; `None` for in-memory chains
    Committed { path: Option<PathBuf> },
    /// New chain written to `alternate_path`; canonical file untouched
    Degraded {
        alternate_path: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub version: u32,
    pub sheet_name: String,
    pub content_digest: String,
    pub status: CommitStatus,
}

impl CommitResult {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, CommitStatus::Degraded { .. })
    }
}

/// Append-only chain of snapshots
pub trait VersionStore {
    /// Snapshot with the highest version, `None` for an empty chain
    fn latest(&self) -> Option<Snapshot>;

    /// Versions present, ascending
    fn versions(&self) -> Vec<u32>;

    /// Append `draft` as version `max + 1` (or 1)
    ///
    /// # Errors
    ///
    /// Persistence failures; a blocked canonical file is not an error but a
    /// `Degraded` status.
    fn commit(&mut self, draft: SnapshotDraft) -> Result<CommitResult>;
}

/// Versioned snapshot for `draft`, with structural formatting carried
/// forward from `previous`
pub fn build_snapshot(
    previous: Option<&Snapshot>,
    draft: SnapshotDraft,
    version: u32,
    options: &ChainOptions,
) -> Snapshot {
    let format = match previous {
        Some(prev) => prev
            .format
            .carry_forward(&draft.columns, options.default_column_width),
        None => SheetFormat::for_columns(&draft.columns, options.default_column_width),
    };
    Snapshot {
        version,
        columns: draft.columns,
        rows: draft.rows,
        format,
        cell_formats: draft.cell_formats,
        created_at: Some(Utc::now()),
    }
}
