//! Merge of change records into a base snapshot
//!
//! The merge never touches the base: it works on an in-memory copy and
//! returns the resulting table together with a [`ChangeLog`] and the
//! notices raised along the way. Records are applied in extraction order,
//! so a later record touching the same cell overrides an earlier one.
//!
//! ## Matching
//!
//! Keys are compared after trimming. A record addresses **every** row whose
//! key matches; duplicate keys are never resolved by picking one row.
//! Records with an empty key match nothing and are reported as ignored.
//!
//! ## Semantics
//!
//! | action     | target | match                         | no match          |
//! |------------|--------|-------------------------------|-------------------|
//! | ADD_UPDATE | row    | overwrite provided fields     | append row        |
//! | ADD_UPDATE | cell   | set column                    | append key+column |
//! | DELETE     | row    | remove rows                   | no-op warning     |
//! | DELETE     | cell   | clear column, keep row        | no-op warning     |
//! | NONE       | any    | nothing                       | nothing           |
//!
//! ADD_UPDATE naming an unknown column appends it to the schema (empty in
//! every existing row). DELETE naming an unknown column is a no-op warning.
//!
//! The key column is never rewritten or cleared by a cell record. A cell
//! ADD_UPDATE on the key column is only honoured when its value is the
//! record's own key; anything else is reported as ignored.

use crate::merge::change_log::{ChangeKind, ChangeLog, RowOrigin};
use crate::model::{Action, ChangeRecord, Row, Snapshot, Target};
use crate::report::{MergeStats, Notice};
use std::collections::BTreeMap;

/// Result of a merge: the next table state plus what happened to it
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Parallel to `rows`
    pub origins: Vec<RowOrigin>,
    pub log: ChangeLog,
    pub notices: Vec<Notice>,
    pub stats: MergeStats,
}

impl MergeOutcome {
    pub fn columns_added(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                Notice::SchemaEvolution { column } => Some(column.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MergeEngine {
    key_column: String,
}

/// Mutable working copy threaded through the record loop
struct Working {
    columns: Vec<String>,
    rows: Vec<(RowOrigin, Row)>,
    appended: usize,
    log: ChangeLog,
    notices: Vec<Notice>,
    stats: MergeStats,
}

impl Working {
    fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    fn add_column(&mut self, column: &str) {
        self.columns.push(column.to_string());
        for (_, row) in &mut self.rows {
            row.entry(column.to_string()).or_default();
        }
        self.stats.columns_added += 1;
        self.notices.push(Notice::SchemaEvolution {
            column: column.to_string(),
        });
    }

    fn matching(&self, key_column: &str, key: &str) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, (_, row))| Snapshot::has_key(row, key_column, key))
            .map(|(i, _)| i)
            .collect()
    }

    /// Append a row holding `values`, every other column empty
    fn append(&mut self, values: impl IntoIterator<Item = (String, String)>) {
        let mut row: Row = self
            .columns
            .iter()
            .map(|c| (c.clone(), String::new()))
            .collect();
        row.extend(values);
        let origin = RowOrigin::New(self.appended);
        self.appended += 1;
        for column in row.keys() {
            self.log.record(origin, column, ChangeKind::Added);
        }
        self.rows.push((origin, row));
        self.stats.rows_appended += 1;
    }
}

impl MergeEngine {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into().trim().to_string(),
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Apply `records` to `base`.
    ///
    /// Infallible: every condition a record can hit is either applied or
    /// reported as a notice.
    pub fn merge(&self, base: &Snapshot, records: &[ChangeRecord]) -> MergeOutcome {
        let mut work = Working {
            columns: base.columns.clone(),
            rows: base
                .rows
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, row)| (RowOrigin::Base(i), row))
                .collect(),
            appended: 0,
            log: ChangeLog::new(),
            notices: Vec::new(),
            stats: MergeStats {
                records_total: records.len(),
                ..MergeStats::default()
            },
        };

        if !work.has_column(&self.key_column) {
            work.add_column(&self.key_column);
        }

        for (i, record) in records.iter().enumerate() {
            if self.apply_record(&mut work, i + 1, record) {
                work.stats.records_applied += 1;
            } else {
                work.stats.records_skipped += 1;
            }
        }

        let (origins, rows) = work.rows.into_iter().unzip();
        MergeOutcome {
            columns: work.columns,
            rows,
            origins,
            log: work.log,
            notices: work.notices,
            stats: work.stats,
        }
    }

    /// Returns whether the record changed the table
    fn apply_record(&self, work: &mut Working, index: usize, record: &ChangeRecord) -> bool {
        if record.action.is_none() {
            return false;
        }
        let key = record.key.trim();
        if key.is_empty() {
            work.notices.push(Notice::IgnoredRecord {
                index,
                key: String::new(),
                reason: "empty key".to_string(),
            });
            return false;
        }

        match (&record.action, &record.target) {
            (Action::AddUpdate, Target::Cell(column)) => {
                self.upsert_cell(work, index, key, column, &record.new_value)
            }
            (Action::AddUpdate, Target::Row) => {
                self.upsert_row(work, key, &record.fields);
                true
            }
            (Action::Delete, Target::Row) => self.delete_rows(work, index, key),
            (Action::Delete, Target::Cell(column)) => self.clear_cell(work, index, key, column),
            (Action::None, _) => false,
        }
    }

    fn upsert_cell(
        &self,
        work: &mut Working,
        index: usize,
        key: &str,
        column: &str,
        value: &str,
    ) -> bool {
        let on_key = column == self.key_column;
        if on_key && value.trim() != key {
            work.notices.push(Notice::IgnoredRecord {
                index,
                key: key.to_string(),
                reason: format!("rewriting the key column '{}' is not allowed", column),
            });
            return false;
        }
        if !work.has_column(column) {
            work.add_column(column);
        }
        let matches = work.matching(&self.key_column, key);
        if matches.is_empty() {
            let mut values = vec![(self.key_column.clone(), key.to_string())];
            if !on_key {
                values.push((column.to_string(), value.to_string()));
            }
            work.append(values);
            return true;
        }
        if on_key {
            // matched rows already hold this key
            return false;
        }
        for i in matches {
            let (origin, row) = &mut work.rows[i];
            row.insert(column.to_string(), value.to_string());
            work.log.record(*origin, column, updated_kind(*origin));
            work.stats.cells_updated += 1;
        }
        true
    }

    fn upsert_row(&self, work: &mut Working, key: &str, fields: &BTreeMap<String, String>) {
        for column in fields.keys().filter(|c| !c.is_empty()) {
            if !work.has_column(column) {
                work.add_column(column);
            }
        }
        let provided = fields
            .iter()
            .filter(|(c, _)| !c.is_empty())
            .filter(|(c, _)| **c != self.key_column);

        let matches = work.matching(&self.key_column, key);
        if matches.is_empty() {
            let values: Vec<(String, String)> = std::iter::once((
                self.key_column.clone(),
                key.to_string(),
            ))
            .chain(provided.map(|(c, v)| (c.clone(), v.clone())))
            .collect();
            work.append(values);
            return;
        }

        let provided: Vec<(&String, &String)> = provided.collect();
        for i in matches {
            let (origin, row) = &mut work.rows[i];
            for (column, value) in &provided {
                row.insert((*column).clone(), (*value).clone());
                work.log.record(*origin, column, updated_kind(*origin));
                work.stats.cells_updated += 1;
            }
        }
    }

    fn delete_rows(&self, work: &mut Working, index: usize, key: &str) -> bool {
        let matches = work.matching(&self.key_column, key);
        if matches.is_empty() {
            work.notices.push(Notice::NoMatch {
                index,
                key: key.to_string(),
                target: Target::Row.label().to_string(),
            });
            return false;
        }
        for i in matches.into_iter().rev() {
            let (origin, _) = work.rows.remove(i);
            work.log.mark_removed(origin);
            work.stats.rows_removed += 1;
        }
        true
    }

    fn clear_cell(&self, work: &mut Working, index: usize, key: &str, column: &str) -> bool {
        if !work.has_column(column) {
            work.notices.push(Notice::UnknownColumn {
                index,
                key: key.to_string(),
                column: column.to_string(),
            });
            return false;
        }
        if column == self.key_column {
            work.notices.push(Notice::IgnoredRecord {
                index,
                key: key.to_string(),
                reason: format!("clearing the key column '{}' is not allowed", column),
            });
            return false;
        }
        let matches = work.matching(&self.key_column, key);
        if matches.is_empty() {
            work.notices.push(Notice::NoMatch {
                index,
                key: key.to_string(),
                target: column.to_string(),
            });
            return false;
        }
        for i in matches {
            let (origin, row) = &mut work.rows[i];
            row.insert(column.to_string(), String::new());
            if origin.is_new() {
                work.log.record(*origin, column, ChangeKind::Added);
            } else {
                work.log.record(*origin, column, ChangeKind::Cleared);
            }
            work.stats.cells_cleared += 1;
        }
        true
    }
}

/// Rows appended earlier in the same merge stay "added" when updated again
fn updated_kind(origin: RowOrigin) -> ChangeKind {
    if origin.is_new() {
        ChangeKind::Added
    } else {
        ChangeKind::Updated
    }
}
