//! File-backed chain, only obtainable while holding the chain lock.

#![allow(clippy::result_large_err)]

use crate::chain::atomic::{stage_and_swap, RenameSwap, SwapOutcome, SwapStrategy};
use crate::chain::lock::ChainLock;
use crate::chain::traits::{
    build_snapshot, ChainOptions, CommitResult, CommitStatus, SnapshotDraft, VersionStore,
};
use crate::errors::{input_missing, Result};
use crate::workbook::Workbook;
use redline_core::model::Snapshot;
use redline_core_types::RunId;
use std::io;
use std::path::{Path, PathBuf};

pub struct LockedChain {
    path: PathBuf,
    workbook: Workbook,
    options: ChainOptions,
    swap: Box<dyn SwapStrategy>,
    _lock: ChainLock,
}

impl std::fmt::Debug for LockedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedChain")
            .field("path", &self.path)
            .field("versions", &self.workbook.snapshot_versions())
            .finish()
    }
}

impl LockedChain {
    /// Lock and load the workbook at `path`
    ///
    /// # Errors
    ///
    /// - `InputMissing` if the workbook does not exist
    /// - `ChainLocked` if another run holds it
    /// - load errors from [`Workbook::load`]
    pub fn open(path: &Path, run_id: &RunId, options: ChainOptions) -> Result<Self> {
        Self::open_with_swap(path, run_id, options, Box::new(RenameSwap))
    }

    /// # Errors
    ///
    /// See [`LockedChain::open`].
    pub fn open_with_swap(
        path: &Path,
        run_id: &RunId,
        options: ChainOptions,
        swap: Box<dyn SwapStrategy>,
    ) -> Result<Self> {
        if !path.is_file() {
            return Err(input_missing(
                "open_chain",
                path,
                io::Error::new(io::ErrorKind::NotFound, "workbook not found"),
            ));
        }
        let lock = ChainLock::acquire(path, run_id)?;
        let workbook = Workbook::load(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
            options,
            swap,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }
}

impl VersionStore for LockedChain {
    fn latest(&self) -> Option<Snapshot> {
        self.workbook.latest_snapshot()
    }

    fn versions(&self) -> Vec<u32> {
        self.workbook.snapshot_versions()
    }

    fn commit(&mut self, draft: SnapshotDraft) -> Result<CommitResult> {
        let version = self.workbook.next_version()?;
        let previous = self.workbook.latest_snapshot();
        let snapshot = build_snapshot(previous.as_ref(), draft, version, &self.options);

        let mut next = self.workbook.clone();
        next.append_snapshot(&snapshot)?;
        let json = next.to_json()?;

        let outcome = stage_and_swap(&self.path, json.as_bytes(), version, self.swap.as_ref())?;
        let status = match outcome {
            SwapOutcome::Swapped => {
                self.workbook = next;
                CommitStatus::Committed {
                    path: Some(self.path.clone()),
                }
            }
            SwapOutcome::Diverted { alternate, reason } => CommitStatus::Degraded {
                alternate_path: alternate,
                reason,
            },
        };

        tracing::debug!(
            version,
            degraded = matches!(status, CommitStatus::Degraded { .. }),
            "chain commit"
        );
        Ok(CommitResult {
            version,
            sheet_name: snapshot.name(),
            content_digest: snapshot.content_digest(),
            status,
        })
    }
}
