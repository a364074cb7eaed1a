//! Per-cell record of what a merge did.

use serde::Serialize;
use std::collections::BTreeMap;

/// Identity of a row in the merge result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RowOrigin {
    /// Row at this index in the base snapshot
    Base(usize),
    /// The n-th row appended by the merge (0-based)
    New(usize),
}

impl RowOrigin {
    pub fn is_new(&self) -> bool {
        matches!(self, RowOrigin::New(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Updated,
    Cleared,
}

/// Cell changes keyed by `(row, column)`; the last write to a cell wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    cells: BTreeMap<(RowOrigin, String), ChangeKind>,
    removed: Vec<RowOrigin>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, origin: RowOrigin, column: &str, kind: ChangeKind) {
        self.cells.insert((origin, column.to_string()), kind);
    }

    /// Forget the row's cell changes and remember it as removed
    pub fn mark_removed(&mut self, origin: RowOrigin) {
        self.cells.retain(|(o, _), _| *o != origin);
        self.removed.push(origin);
    }

    pub fn kind(&self, origin: RowOrigin, column: &str) -> Option<ChangeKind> {
        self.cells.get(&(origin, column.to_string())).copied()
    }

    pub fn removed(&self) -> &[RowOrigin] {
        &self.removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowOrigin, &str, ChangeKind)> {
        self.cells
            .iter()
            .map(|((origin, column), kind)| (*origin, column.as_str(), *kind))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.removed.is_empty()
    }
}
