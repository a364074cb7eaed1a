//! Property tests for the merge.

mod common;

use common::{row, snapshot, KEY};
use proptest::prelude::*;
use redline_core::merge::MergeEngine;
use redline_core::model::{Action, ChangeRecord, Row, Snapshot};
use std::collections::BTreeMap;

fn key_strategy() -> impl Strategy<Value = String> {
    "[A-D][0-9]"
}

fn base_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec((key_strategy(), "[a-z]{0,6}"), 0..8).prop_map(|pairs| {
        let rows: Vec<Row> = pairs
            .iter()
            .map(|(k, s)| row(&[(KEY, k.as_str()), ("Status", s.as_str())]))
            .collect();
        snapshot(1, &[KEY, "Status"], rows)
    })
}

/// Base with unique keys
fn unique_base_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map(key_strategy(), "[a-z]{0,6}", 0..8).prop_map(|map| {
        let rows: Vec<Row> = map
            .iter()
            .map(|(k, s)| row(&[(KEY, k.as_str()), ("Status", s.as_str())]))
            .collect();
        snapshot(1, &[KEY, "Status"], rows)
    })
}

/// Cell records target either `Status` or the key column; values are
/// sometimes another key so key rewrites get exercised.
fn record_strategy() -> impl Strategy<Value = ChangeRecord> {
    let action = prop_oneof![Just(Action::AddUpdate), Just(Action::Delete), Just(Action::None)];
    let column = prop_oneof![Just("Status"), Just(KEY)];
    let value = prop_oneof!["[a-z]{0,4}", key_strategy()];
    (key_strategy(), prop::bool::ANY, column, value, action).prop_map(
        |(key, whole_row, column, value, action)| {
            if whole_row {
                let fields = BTreeMap::from([
                    (KEY.to_string(), key.clone()),
                    ("Status".to_string(), value),
                ]);
                ChangeRecord::row(key, fields, action)
            } else {
                ChangeRecord::cell(key, column, value, action)
            }
        },
    )
}

proptest! {
    #[test]
    fn prop_none_only_changes_nothing(
        base in base_strategy(),
        keys in prop::collection::vec(key_strategy(), 0..6),
    ) {
        let records: Vec<ChangeRecord> = keys
            .into_iter()
            .map(|k| ChangeRecord::cell(k, "Status", "x", Action::None))
            .collect();

        let outcome = MergeEngine::new(KEY).merge(&base, &records);

        prop_assert_eq!(&outcome.columns, &base.columns);
        prop_assert_eq!(&outcome.rows, &base.rows);
        prop_assert!(outcome.log.is_empty());
    }

    #[test]
    fn prop_whole_row_delete_removes_key(base in base_strategy(), key in key_strategy()) {
        let records = vec![ChangeRecord::row(key.clone(), BTreeMap::new(), Action::Delete)];

        let outcome = MergeEngine::new(KEY).merge(&base, &records);

        prop_assert!(outcome.rows.iter().all(|r| Snapshot::cell(r, KEY) != key));
        let others = base.rows.iter().filter(|r| Snapshot::cell(r, KEY) != key).count();
        prop_assert_eq!(outcome.rows.len(), others);
    }

    #[test]
    fn prop_unique_keys_stay_unique(
        base in unique_base_strategy(),
        records in prop::collection::vec(record_strategy(), 0..12),
    ) {
        let outcome = MergeEngine::new(KEY).merge(&base, &records);

        let mut seen = std::collections::HashSet::new();
        for r in &outcome.rows {
            prop_assert!(seen.insert(Snapshot::cell(r, KEY).to_string()));
        }
        prop_assert!(outcome.columns.iter().any(|c| c == KEY));
        prop_assert_eq!(outcome.rows.len(), outcome.origins.len());
    }

    #[test]
    fn prop_untouched_rows_keep_relative_order(
        base in unique_base_strategy(),
        records in prop::collection::vec(record_strategy(), 0..12),
    ) {
        let outcome = MergeEngine::new(KEY).merge(&base, &records);

        let base_positions: Vec<usize> = outcome
            .origins
            .iter()
            .filter_map(|o| match o {
                redline_core::merge::RowOrigin::Base(i) => Some(*i),
                redline_core::merge::RowOrigin::New(_) => None,
            })
            .collect();
        let mut sorted = base_positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(base_positions, sorted);
    }

    #[test]
    fn prop_every_row_keeps_a_key_from_base_or_records(
        base in unique_base_strategy(),
        records in prop::collection::vec(record_strategy(), 0..12),
    ) {
        let outcome = MergeEngine::new(KEY).merge(&base, &records);

        for (r, origin) in outcome.rows.iter().zip(&outcome.origins) {
            let key = Snapshot::cell(r, KEY);
            match origin {
                redline_core::merge::RowOrigin::Base(i) => {
                    prop_assert_eq!(key, Snapshot::cell(&base.rows[*i], KEY));
                }
                redline_core::merge::RowOrigin::New(_) => {
                    prop_assert!(records.iter().any(|rec| rec.key == key));
                }
            }
        }
    }
}
