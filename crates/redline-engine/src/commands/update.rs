//! Update pipeline: source → change records → merge → highlight → commit.
//!
//! ## Pipeline (in order):
//! 1. Read the source (table or change list); a missing file halts
//! 2. Extract change records; extraction errors halt before anything is
//!    locked or written
//! 3. Open the destination chain, taking the chain lock
//! 4. Merge onto the latest snapshot (or a key-column skeleton)
//! 5. Highlight the merged table
//! 6. Commit (stage-then-swap; a blocked swap is a degraded success)
//!
//! Notices from the merge and the commit accumulate into the run report and
//! are logged at `warn`.

#![allow(clippy::result_large_err)]

use redline_core::audit::{AuditHighlighter, MarkerCounts};
use redline_core::config::RedlineConfig;
use redline_core::errors::ExError;
use redline_core::extract::ChangeExtractor;
use redline_core::merge::MergeEngine;
use redline_core::model::{ChangeRecord, Snapshot};
use redline_core::report::{Notice, RunReport};
use redline_core::{log_op_end, log_op_error, log_op_start};
use redline_core_types::{RunContext, RunId};
use redline_store::chain::{
    ChainOptions, CommitResult, CommitStatus, LockedChain, RenameSwap, SnapshotDraft,
    SwapStrategy, VersionStore,
};
use redline_store::errors::Result;
use redline_store::source::{read_change_records, read_source_table};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What the source file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Highlighted table from the document reader
    #[default]
    Table,
    /// Pre-extracted wire-shape change list
    ChangeList,
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub source_kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    Success {
        version: u32,
        path: PathBuf,
    },
    Degraded {
        version: u32,
        alternate_path: PathBuf,
        reason: String,
    },
}

impl UpdateStatus {
    pub fn version(&self) -> u32 {
        match self {
            UpdateStatus::Success { version, .. } | UpdateStatus::Degraded { version, .. } => {
                *version
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, UpdateStatus::Degraded { .. })
    }
}

/// Caller-facing result of a run
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    #[serde(flatten)]
    pub status: UpdateStatus,
    pub sheet_name: String,
    pub content_digest: String,
    pub markers: MarkerCounts,
    pub report: RunReport,
    pub run_id: RunId,
}

/// Commit plus what the merge reported, before it is tied to a destination
#[derive(Debug, Clone)]
pub struct AppliedChanges {
    pub commit: CommitResult,
    pub report: RunReport,
    pub markers: MarkerCounts,
}

/// Read the source named by `request` and turn it into change records
///
/// # Errors
///
/// `InputMissing` for an unreadable source, extraction errors otherwise.
pub fn load_changes(
    source: &Path,
    kind: SourceKind,
    config: &RedlineConfig,
) -> Result<Vec<ChangeRecord>> {
    match kind {
        SourceKind::Table => {
            let table = read_source_table(source)?;
            let extractor = ChangeExtractor::from_config(config).map_err(ExError::from)?;
            extractor
                .extract(&table)
                .map_err(|e| ExError::from(e).with_path(source))
        }
        SourceKind::ChangeList => read_change_records(source, config.key_column()),
    }
}

/// Merge `records` onto the latest snapshot of `store`, highlight and commit
///
/// # Errors
///
/// Persistence failures from the store.
pub fn apply_changes(
    store: &mut dyn VersionStore,
    records: &[ChangeRecord],
    config: &RedlineConfig,
) -> Result<AppliedChanges> {
    let key_column = config.key_column();
    let base = store
        .latest()
        .unwrap_or_else(|| Snapshot::skeleton(key_column));

    let outcome = MergeEngine::new(key_column).merge(&base, records);
    tracing::debug!(
        base_version = base.version,
        rows = outcome.rows.len(),
        columns = outcome.columns.len(),
        "merge complete"
    );

    let highlight = AuditHighlighter::new(&config.audit).highlight(&base, &outcome);

    let draft = SnapshotDraft {
        columns: outcome.columns,
        rows: outcome.rows,
        cell_formats: highlight.cell_formats,
    };
    let commit = store.commit(draft)?;

    let mut report = RunReport::new(outcome.notices, outcome.stats);
    if let CommitStatus::Degraded {
        alternate_path,
        reason,
    } = &commit.status
    {
        report.push(Notice::CommitBlocked {
            alternate_path: alternate_path.clone(),
            reason: reason.clone(),
        });
    }

    Ok(AppliedChanges {
        commit,
        report,
        markers: highlight.counts,
    })
}

/// Run the whole pipeline for one source and destination
///
/// # Errors
///
/// `InputMissing`, extraction errors, `ChainLocked` and unrecoverable
/// persistence failures. The error carries the run id.
pub fn run_update(
    request: &UpdateRequest,
    config: &RedlineConfig,
    ctx: &RunContext,
) -> Result<UpdateOutcome> {
    run_update_with_swap(request, config, ctx, Box::new(RenameSwap))
}

/// [`run_update`] with an explicit swap strategy
///
/// # Errors
///
/// See [`run_update`].
pub fn run_update_with_swap(
    request: &UpdateRequest,
    config: &RedlineConfig,
    ctx: &RunContext,
    swap: Box<dyn SwapStrategy>,
) -> Result<UpdateOutcome> {
    log_op_start!(
        "run_update",
        run_id = ctx.run_id.as_str(),
        source = %request.source.display(),
        destination = %request.destination.display()
    );
    let start = std::time::Instant::now();

    let result = run_update_impl(request, config, ctx, swap).map_err(|e| {
        log_op_error!(
            "run_update",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = ctx.run_id.as_str()
        );
        annotate(e, ctx)
    })?;

    log_op_end!(
        "run_update",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = ctx.run_id.as_str(),
        version = result.status.version(),
        degraded = result.status.is_degraded()
    );
    Ok(result)
}

fn run_update_impl(
    request: &UpdateRequest,
    config: &RedlineConfig,
    ctx: &RunContext,
    swap: Box<dyn SwapStrategy>,
) -> Result<UpdateOutcome> {
    let records = load_changes(&request.source, request.source_kind, config)?;
    tracing::debug!(change_count = records.len(), "change records loaded");

    let mut chain = LockedChain::open_with_swap(
        &request.destination,
        &ctx.run_id,
        chain_options(config),
        swap,
    )?;
    let applied = apply_changes(&mut chain, &records, config)?;

    Ok(finish(applied, &request.destination, ctx))
}

/// Attach the run's correlation ids to an error
pub(crate) fn annotate(err: ExError, ctx: &RunContext) -> ExError {
    let err = err.with_run_id(ctx.run_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

pub(crate) fn chain_options(config: &RedlineConfig) -> ChainOptions {
    ChainOptions {
        default_column_width: config.audit.default_column_width,
    }
}

/// Tie a commit to its destination and log the report
pub(crate) fn finish(applied: AppliedChanges, destination: &Path, ctx: &RunContext) -> UpdateOutcome {
    for notice in &applied.report.notices {
        if notice.is_warning() {
            tracing::warn!(run_id = ctx.run_id.as_str(), class = ?notice.class(), "{}", notice);
        } else {
            tracing::info!(run_id = ctx.run_id.as_str(), class = ?notice.class(), "{}", notice);
        }
    }

    let commit = applied.commit;
    let status = match commit.status {
        CommitStatus::Committed { path } => UpdateStatus::Success {
            version: commit.version,
            path: path.unwrap_or_else(|| destination.to_path_buf()),
        },
        CommitStatus::Degraded {
            alternate_path,
            reason,
        } => UpdateStatus::Degraded {
            version: commit.version,
            alternate_path,
            reason,
        },
    };

    UpdateOutcome {
        status,
        sheet_name: commit.sheet_name,
        content_digest: commit.content_digest,
        markers: applied.markers,
        report: applied.report,
        run_id: ctx.run_id.clone(),
    }
}
