//! In-process chain for tests and dry runs.

#![allow(clippy::result_large_err)]

use crate::chain::traits::{
    build_snapshot, ChainOptions, CommitResult, CommitStatus, SnapshotDraft, VersionStore,
};
use crate::errors::Result;
use crate::workbook::Workbook;
use redline_core::model::Snapshot;

#[derive(Debug, Clone, Default)]
pub struct MemoryChain {
    workbook: Workbook,
    options: ChainOptions,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_workbook(workbook: Workbook, options: ChainOptions) -> Self {
        Self { workbook, options }
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn snapshot(&self, version: u32) -> Option<Snapshot> {
        self.workbook.snapshot(version)
    }
}

impl VersionStore for MemoryChain {
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
        self.workbook.append_snapshot(&snapshot)?;
        Ok(CommitResult {
            version,
            sheet_name: snapshot.name(),
            content_digest: snapshot.content_digest(),
            status: CommitStatus::Committed { path: None },
        })
    }
}
