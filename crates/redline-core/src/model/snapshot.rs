//! Snapshot (one version of the table) and its formatting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Column name → cell value. Absent columns read as empty.
pub type Row = BTreeMap<String, String>;

/// Column name → formatting of one cell.
pub type CellFormats = BTreeMap<String, CellFormat>;

/// Width given to columns that have no carried-forward width
pub const DEFAULT_COLUMN_WIDTH: f64 = 12.0;

/// Audit marker placed on a cell of a freshly committed snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Added,
    Updated,
    Deleted,
}

/// Visual style of a cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wrap_text: bool,
    /// ARGB fill color, e.g. `FFFFEB9C`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }
}

/// Formatting of one cell: optional audit marker plus style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// Structural formatting of a sheet, independent of its values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetFormat {
    #[serde(default)]
    pub column_widths: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_style: Option<CellStyle>,
    /// Per-column style applied to unmarked body cells
    #[serde(default)]
    pub style_templates: BTreeMap<String, CellStyle>,
}

impl SheetFormat {
    /// Fresh format for a sheet with no predecessor
    pub fn for_columns(columns: &[String], default_width: f64) -> Self {
        Self {
            column_widths: columns
                .iter()
                .map(|c| (c.clone(), default_width))
                .collect(),
            header_style: None,
            style_templates: BTreeMap::new(),
        }
    }

    /// Format of the next sheet: widths, header style and templates of this
    /// sheet for the columns that survive, default width for new columns.
    pub fn carry_forward(&self, columns: &[String], default_width: f64) -> Self {
        let column_widths = columns
            .iter()
            .map(|c| {
                let width = self.column_widths.get(c).copied().unwrap_or(default_width);
                (c.clone(), width)
            })
            .collect();
        let style_templates = self
            .style_templates
            .iter()
            .filter(|(c, _)| columns.contains(c))
            .map(|(c, s)| (c.clone(), s.clone()))
            .collect();
        Self {
            column_widths,
            header_style: self.header_style.clone(),
            style_templates,
        }
    }
}

/// One immutable version of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Positive for committed snapshots; 0 marks a synthesized skeleton
    pub version: u32,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    #[serde(default)]
    pub format: SheetFormat,
    /// Parallel to `rows`
    #[serde(default)]
    pub cell_formats: Vec<CellFormats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Empty table holding only the key column, used when the chain has no
    /// snapshot yet.
    pub fn skeleton(key_column: &str) -> Self {
        Self {
            version: 0,
            columns: vec![key_column.to_string()],
            rows: Vec::new(),
            format: SheetFormat::default(),
            cell_formats: Vec::new(),
            created_at: None,
        }
    }

    /// Sheet name of this snapshot, `V<version>`
    pub fn name(&self) -> String {
        format!("V{}", self.version)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Value of a cell, empty when the column is absent from the row
    pub fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    /// A row whose every column is blank
    pub fn is_blank_row(row: &Row) -> bool {
        row.values().all(|v| v.trim().is_empty())
    }

    /// Whether the row's (trimmed) key equals `key`. An empty key matches
    /// nothing.
    pub fn has_key(row: &Row, key_column: &str, key: &str) -> bool {
        let key = key.trim();
        !key.is_empty() && Self::cell(row, key_column).trim() == key
    }

    /// SHA-256 over columns and rows (in column order), hex encoded.
    ///
    /// Formatting and timestamps are excluded, so two snapshots with the
    /// same values share a digest.
    pub fn content_digest(&self) -> String {
        content_digest(&self.columns, &self.rows)
    }
}

/// Digest of a table's values; see [`Snapshot::content_digest`].
pub fn content_digest(columns: &[String], rows: &[Row]) -> String {
    let mut hasher = Sha256::new();
    for column in columns {
        hasher.update(column.as_bytes());
        hasher.update([0x1f]);
    }
    hasher.update([0x1e]);
    for row in rows {
        for column in columns {
            hasher.update(Snapshot::cell(row, column).as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_has_key_trims_and_skips_empty() {
        assert!(Snapshot::has_key(&row(&[("Log_ID", " A1 ")]), "Log_ID", "A1"));
        assert!(!Snapshot::has_key(&row(&[("Log_ID", "")]), "Log_ID", ""));
        assert!(!Snapshot::has_key(&row(&[("Status", "A1")]), "Log_ID", "A1"));
    }

    #[test]
    fn test_digest_ignores_missing_versus_empty() {
        let columns = vec!["Log_ID".to_string(), "Status".to_string()];
        let a = vec![row(&[("Log_ID", "A1")])];
        let b = vec![row(&[("Log_ID", "A1"), ("Status", "")])];
        assert_eq!(content_digest(&columns, &a), content_digest(&columns, &b));
    }

    #[test]
    fn test_digest_is_cell_boundary_sensitive() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let x = vec![row(&[("a", "ab"), ("b", "")])];
        let y = vec![row(&[("a", "a"), ("b", "b")])];
        assert_ne!(content_digest(&columns, &x), content_digest(&columns, &y));
    }

    #[test]
    fn test_carry_forward_keeps_widths_and_defaults_new_columns() {
        let mut format = SheetFormat::default();
        format.column_widths.insert("Log_ID".to_string(), 20.0);
        format
            .style_templates
            .insert("Log_ID".to_string(), CellStyle::default().with_fill("FFEEEEEE"));
        let columns = vec!["Log_ID".to_string(), "Owner".to_string()];

        let next = format.carry_forward(&columns, DEFAULT_COLUMN_WIDTH);

        assert_eq!(next.column_widths.get("Log_ID"), Some(&20.0));
        assert_eq!(next.column_widths.get("Owner"), Some(&DEFAULT_COLUMN_WIDTH));
        assert!(next.style_templates.contains_key("Log_ID"));
    }
}
