//! Source table → ordered change records.
//!
//! Row numbers in errors are 1-based positions among the data rows (the
//! header is not counted).

use crate::config::{ExtractionMode, RedlineConfig};
use crate::errors::{RedlineError, Result};
use crate::model::{Action, ChangeRecord, SourceCell, SourceTable};
use crate::rules::ColorRuleMap;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
pub struct ChangeExtractor {
    key_column: String,
    mode: ExtractionMode,
    rules: ColorRuleMap,
}

/// Header after trimming, with the position of the key column
struct Header {
    names: Vec<String>,
    key_index: usize,
}

impl ChangeExtractor {
    pub fn new(key_column: impl Into<String>, mode: ExtractionMode, rules: ColorRuleMap) -> Self {
        Self {
            key_column: key_column.into().trim().to_string(),
            mode,
            rules,
        }
    }

    /// # Errors
    ///
    /// `InvalidConfig` if the configured color vocabulary does not parse.
    pub fn from_config(config: &RedlineConfig) -> Result<Self> {
        Ok(Self::new(
            config.key_column(),
            config.mode,
            config.color_rules()?,
        ))
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Extract change records in source order (row order, then column
    /// order within a row in cell mode).
    ///
    /// # Errors
    ///
    /// - `KeyColumnMissing` if the header lacks the key column; raised
    ///   before any row is read
    /// - `DuplicateColumn` if two header cells carry the same name
    /// - `MixedHighlightModes` if a row carries highlights belonging to the
    ///   other mode
    pub fn extract(&self, table: &SourceTable) -> Result<Vec<ChangeRecord>> {
        let header = self.read_header(&table.header)?;
        let mut records = Vec::new();

        for (i, raw) in table.rows.iter().enumerate() {
            let row_number = i + 1;
            let cells = normalize_row(raw, header.names.len());
            match self.mode {
                ExtractionMode::Row => {
                    if let Some(record) = self.extract_row(&header, &cells, row_number)? {
                        records.push(record);
                    }
                }
                ExtractionMode::Cell => {
                    self.extract_cells(&header, &cells, row_number, &mut records)?;
                }
            }
        }

        tracing::debug!(
            mode = ?self.mode,
            row_count = table.rows.len(),
            change_count = records.len(),
            "extracted change records"
        );
        Ok(records)
    }

    fn read_header(&self, raw: &[String]) -> Result<Header> {
        let names: Vec<String> = raw.iter().map(|h| h.trim().to_string()).collect();

        let mut seen = HashSet::new();
        for name in names.iter().filter(|n| !n.is_empty()) {
            if !seen.insert(name.as_str()) {
                return Err(RedlineError::DuplicateColumn {
                    column: name.clone(),
                });
            }
        }

        let key_index = names
            .iter()
            .position(|n| *n == self.key_column)
            .ok_or_else(|| RedlineError::KeyColumnMissing {
                column: self.key_column.clone(),
                header: names.clone(),
            })?;

        Ok(Header { names, key_index })
    }

    /// One record per row, action decided by the first highlighted cell.
    fn extract_row(
        &self,
        header: &Header,
        cells: &[SourceCell],
        row_number: usize,
    ) -> Result<Option<ChangeRecord>> {
        let Some(first) = cells.iter().find_map(SourceCell::highlight) else {
            return Ok(None);
        };
        let action = self.rules.action_for(Some(first));
        if action.is_none() {
            tracing::debug!(row = row_number, color = first, "unmapped row highlight");
            return Ok(None);
        }

        for (name, cell) in header.names.iter().zip(cells) {
            let cell_action = self.rules.action_for(cell.highlight());
            let has_text = !cell.text.trim().is_empty();
            let conflicts = if has_text {
                cell_action != action
            } else {
                !cell_action.is_none() && cell_action != action
            };
            if conflicts {
                return Err(RedlineError::MixedHighlightModes {
                    row: row_number,
                    reason: format!(
                        "row is highlighted as {} but column '{}' is {}",
                        action,
                        display_name(name),
                        describe(cell_action)
                    ),
                });
            }
        }

        let fields: BTreeMap<String, String> = header
            .names
            .iter()
            .zip(cells)
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.clone(), cell.text.trim().to_string()))
            .collect();
        let key = cells[header.key_index].text.trim().to_string();

        Ok(Some(ChangeRecord::row(key, fields, action)))
    }

    /// One record per highlighted, mapped cell.
    fn extract_cells(
        &self,
        header: &Header,
        cells: &[SourceCell],
        row_number: usize,
        out: &mut Vec<ChangeRecord>,
    ) -> Result<()> {
        let key = cells[header.key_index].text.trim();

        for (j, (name, cell)) in header.names.iter().zip(cells).enumerate() {
            if name.is_empty() {
                continue;
            }
            let action = self.rules.action_for(cell.highlight());
            if action.is_none() {
                continue;
            }
            if j == header.key_index && action == Action::Delete {
                return Err(RedlineError::MixedHighlightModes {
                    row: row_number,
                    reason: format!(
                        "DELETE highlight on key column '{}' is a whole-row edit",
                        name
                    ),
                });
            }
            out.push(ChangeRecord::cell(key, name, cell.text.trim(), action));
        }
        Ok(())
    }
}

/// Pad short rows with empty cells and drop cells beyond the header
fn normalize_row(raw: &[SourceCell], width: usize) -> Vec<SourceCell> {
    let mut cells: Vec<SourceCell> = raw.iter().take(width).cloned().collect();
    cells.resize_with(width, SourceCell::default);
    cells
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<unnamed>"
    } else {
        name
    }
}

fn describe(action: Action) -> &'static str {
    match action {
        Action::None => "not highlighted",
        Action::AddUpdate => "highlighted as ADD_UPDATE",
        Action::Delete => "highlighted as DELETE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_short_rows_are_padded() {
        let cells = normalize_row(&[SourceCell::plain("A1")], 3);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[2], SourceCell::default());
    }

    #[test]
    fn test_long_rows_are_truncated() {
        let raw = vec![SourceCell::plain("a"); 4];
        assert_eq!(normalize_row(&raw, 2).len(), 2);
    }

    #[test]
    fn test_header_names_are_trimmed() {
        let extractor =
            ChangeExtractor::new("Log_ID", ExtractionMode::Cell, ColorRuleMap::standard());
        let h = extractor
            .read_header(&header(&[" Log_ID ", "Status"]))
            .unwrap();
        assert_eq!(h.key_index, 0);
        assert_eq!(h.names[0], "Log_ID");
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let extractor =
            ChangeExtractor::new("Log_ID", ExtractionMode::Cell, ColorRuleMap::standard());
        let err = extractor
            .read_header(&header(&["Log_ID", "Status", "Status "]))
            .err()
            .unwrap();
        assert!(matches!(err, RedlineError::DuplicateColumn { .. }));
    }
}
