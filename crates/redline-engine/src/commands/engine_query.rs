//! Engine-level read-only query surface.
//!
//! `apply_engine_query` reads a workbook without taking the chain lock and
//! never writes.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use redline_core::errors::{ExError, ExErrorKind};
use redline_core::model::Snapshot;
use redline_store::errors::Result;
use redline_store::workbook::Workbook;
use serde::Serialize;
use std::path::PathBuf;

/// One snapshot sheet as listed by `versions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSummary {
    pub version: u32,
    pub sheet_name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub content_digest: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl VersionSummary {
    fn of(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version,
            sheet_name: snapshot.name(),
            row_count: snapshot.rows.len(),
            column_count: snapshot.columns.len(),
            content_digest: snapshot.content_digest(),
            created_at: snapshot.created_at,
        }
    }
}

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// All snapshot sheets, ascending by version.
    ListVersions { workbook: PathBuf },
    /// One snapshot; the latest when `version` is `None`.
    GetSnapshot {
        workbook: PathBuf,
        version: Option<u32>,
    },
}

#[derive(Debug, Clone)]
pub enum EngineQueryResult {
    Versions(Vec<VersionSummary>),
    Snapshot(Snapshot),
}

/// Apply a read-only query.
///
/// # Errors
///
/// Load errors from [`Workbook::load`]; `InvalidInput` when the requested
/// version does not exist (or the chain is empty).
pub fn apply_engine_query(query: EngineQuery) -> Result<EngineQueryResult> {
    match query {
        EngineQuery::ListVersions { workbook } => {
            let book = Workbook::load(&workbook)?;
            let summaries = book
                .snapshot_versions()
                .into_iter()
                .filter_map(|v| book.snapshot(v))
                .map(|s| VersionSummary::of(&s))
                .collect();
            Ok(EngineQueryResult::Versions(summaries))
        }
        EngineQuery::GetSnapshot { workbook, version } => {
            let book = Workbook::load(&workbook)?;
            let snapshot = match version {
                Some(v) => book.snapshot(v),
                None => book.latest_snapshot(),
            };
            snapshot.map(EngineQueryResult::Snapshot).ok_or_else(|| {
                let what = version.map_or("any snapshot".to_string(), |v| format!("V{}", v));
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("get_snapshot")
                    .with_path(&workbook)
                    .with_message(format!("workbook has no {}", what))
            })
        }
    }
}
