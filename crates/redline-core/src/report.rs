//! Run report: non-fatal notices and merge statistics.
//!
//! Only input and extraction failures stop a run. Everything else a run
//! notices (no-op deletes, ignored records, schema growth, a blocked swap)
//! accumulates here and is returned with the outcome.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Classification of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeClass {
    MergeNoOpWarning,
    SchemaEvolutionNotice,
    CommitBlocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Record skipped without touching the table (1-based record index)
    IgnoredRecord {
        index: usize,
        key: String,
        reason: String,
    },
    /// DELETE whose key matched no row
    NoMatch {
        index: usize,
        key: String,
        target: String,
    },
    /// DELETE naming a column the table does not have
    UnknownColumn {
        index: usize,
        key: String,
        column: String,
    },
    /// Column appended to the schema
    SchemaEvolution { column: String },
    /// Canonical swap failed; the new chain state lives at `alternate_path`
    CommitBlocked {
        alternate_path: PathBuf,
        reason: String,
    },
}

impl Notice {
    pub fn class(&self) -> NoticeClass {
        match self {
            Notice::IgnoredRecord { .. }
            | Notice::NoMatch { .. }
            | Notice::UnknownColumn { .. } => NoticeClass::MergeNoOpWarning,
            Notice::SchemaEvolution { .. } => NoticeClass::SchemaEvolutionNotice,
            Notice::CommitBlocked { .. } => NoticeClass::CommitBlocked,
        }
    }

    /// Warnings are surfaced at `warn` level; schema notices are informational
    pub fn is_warning(&self) -> bool {
        !matches!(self.class(), NoticeClass::SchemaEvolutionNotice)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::IgnoredRecord { index, key, reason } => {
                write!(f, "record #{} (key '{}') ignored: {}", index, key, reason)
            }
            Notice::NoMatch { index, key, target } => write!(
                f,
                "record #{}: DELETE {} matched no row with key '{}'",
                index, target, key
            ),
            Notice::UnknownColumn { index, key, column } => write!(
                f,
                "record #{}: DELETE on unknown column '{}' (key '{}') skipped",
                index, column, key
            ),
            Notice::SchemaEvolution { column } => write!(f, "column '{}' added", column),
            Notice::CommitBlocked {
                alternate_path,
                reason,
            } => write!(
                f,
                "canonical file could not be replaced ({}); new version written to {}",
                reason,
                alternate_path.display()
            ),
        }
    }
}

/// Counters accumulated by the merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub records_total: usize,
    pub records_applied: usize,
    /// NONE records and records reported as ignored or no-op
    pub records_skipped: usize,
    pub rows_appended: usize,
    pub rows_removed: usize,
    pub cells_updated: usize,
    pub cells_cleared: usize,
    pub columns_added: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub notices: Vec<Notice>,
    pub stats: MergeStats,
}

impl RunReport {
    pub fn new(notices: Vec<Notice>, stats: MergeStats) -> Self {
        Self { notices, stats }
    }

    pub fn push(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.is_warning())
    }

    pub fn count_class(&self, class: NoticeClass) -> usize {
        self.notices.iter().filter(|n| n.class() == class).count()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
