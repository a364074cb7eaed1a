use redline_core::model::{Row, Snapshot, SourceCell, SourceTable};

pub const KEY: &str = "Log_ID";

/// Build a row from `(column, value)` pairs
#[allow(dead_code)]
pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Committed snapshot V<version> with the given columns and rows
#[allow(dead_code)]
pub fn snapshot(version: u32, columns: &[&str], rows: Vec<Row>) -> Snapshot {
    Snapshot {
        version,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
        ..Snapshot::skeleton(KEY)
    }
}

/// The V1 used by the walkthrough scenarios: `[{Log_ID: A1, Status: Open}]`
#[allow(dead_code)]
pub fn v1_open() -> Snapshot {
    snapshot(
        1,
        &[KEY, "Status"],
        vec![row(&[(KEY, "A1"), ("Status", "Open")])],
    )
}

#[allow(dead_code)]
pub fn table(header: &[&str], rows: Vec<Vec<SourceCell>>) -> SourceTable {
    SourceTable {
        header: header.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

#[allow(dead_code)]
pub fn red(text: &str) -> SourceCell {
    SourceCell::highlighted(text, "RED")
}

#[allow(dead_code)]
pub fn pink(text: &str) -> SourceCell {
    SourceCell::highlighted(text, "PINK")
}

#[allow(dead_code)]
pub fn plain(text: &str) -> SourceCell {
    SourceCell::plain(text)
}
