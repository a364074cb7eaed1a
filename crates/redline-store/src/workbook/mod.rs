//! The workbook file: an ordered list of named sheets.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "sheets": [
//!     {"name": "Notes", "columns": [], "rows": []},
//!     {"name": "V1", "version": 1, "columns": ["Log_ID"], "rows": [], ...}
//!   ]
//! }
//! ```
//!
//! Sheets whose name is `V<n>` are snapshots; every other sheet is carried
//! through commits untouched.

pub mod naming;

use crate::errors::{input_missing, io_error, serialization, Result};
use chrono::{DateTime, Utc};
use redline_core::errors::{ExError, ExErrorKind};
use redline_core::model::{CellFormats, Row, SheetFormat, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

pub use naming::{parse_snapshot_name, snapshot_name, validate_snapshot_name};

/// Current on-disk format
pub const FORMAT_VERSION: u32 = 1;

/// Structural problems found while loading or extending a workbook
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkbookError {
    #[error("unsupported format_version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("duplicate sheet name '{name}'")]
    DuplicateSheet { name: String },

    #[error("sheet '{name}' carries version {version}; snapshot sheets must be named V<version>")]
    VersionMismatch { name: String, version: u32 },

    #[error("snapshot sheet '{name}' has no version")]
    MissingVersion { name: String },

    #[error("version {version} does not extend the chain (next is {expected})")]
    OutOfOrder { version: u32, expected: u32 },

    #[error("no version can follow V{latest}")]
    VersionsExhausted { latest: u32 },
}

impl WorkbookError {
    pub fn kind(&self) -> ExErrorKind {
        match self {
            WorkbookError::DuplicateSheet { .. }
            | WorkbookError::VersionMismatch { .. }
            | WorkbookError::MissingVersion { .. } => ExErrorKind::InvalidSheetName,
            WorkbookError::UnsupportedFormat { .. }
            | WorkbookError::OutOfOrder { .. }
            | WorkbookError::VersionsExhausted { .. } => ExErrorKind::Persistence,
        }
    }
}

impl From<WorkbookError> for ExError {
    fn from(err: WorkbookError) -> Self {
        ExError::new(err.kind())
            .with_op("validate_workbook")
            .with_message(err.to_string())
    }
}

/// One sheet of the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub format: SheetFormat,
    #[serde(default)]
    pub cell_formats: Vec<CellFormats>,
}

impl Sheet {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            name: snapshot_name(snapshot.version),
            version: Some(snapshot.version),
            created_at: snapshot.created_at,
            content_digest: Some(snapshot.content_digest()),
            columns: snapshot.columns.clone(),
            rows: snapshot.rows.clone(),
            format: snapshot.format.clone(),
            cell_formats: snapshot.cell_formats.clone(),
        }
    }

    /// Snapshot held by this sheet, `None` for non-snapshot sheets
    pub fn to_snapshot(&self) -> Option<Snapshot> {
        let version = self.version?;
        Some(Snapshot {
            version,
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            format: self.format.clone(),
            cell_formats: self.cell_formats.clone(),
            created_at: self.created_at,
        })
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub format_version: u32,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Empty workbook: zero snapshots
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            sheets: Vec::new(),
        }
    }

    /// Read and validate a workbook file
    ///
    /// # Errors
    ///
    /// - `InputMissing` if the file is absent or unreadable
    /// - `Serialization` if it is not a workbook document
    /// - `InvalidSheetName` / `Persistence` for structural problems
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| input_missing("load_workbook", path, e))?;
        Self::from_json(&content).map_err(|e| e.with_path(path))
    }

    /// # Errors
    ///
    /// See [`Workbook::load`].
    pub fn from_json(content: &str) -> Result<Self> {
        let workbook: Workbook =
            serde_json::from_str(content).map_err(|e| serialization("parse_workbook", e))?;
        workbook.validate()?;
        Ok(workbook)
    }

    /// # Errors
    ///
    /// `Serialization` if the workbook cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| serialization("encode_workbook", e))
    }

    /// Write a brand-new workbook file; never overwrites
    ///
    /// # Errors
    ///
    /// `Io` if the file already exists or cannot be written.
    pub fn write_new(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| io_error("create_workbook", path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| io_error("create_workbook", path, e))?;
        Ok(())
    }

    fn validate(&self) -> std::result::Result<(), WorkbookError> {
        if self.format_version != FORMAT_VERSION {
            return Err(WorkbookError::UnsupportedFormat {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let mut names = HashSet::new();
        for sheet in &self.sheets {
            if !names.insert(sheet.name.as_str()) {
                return Err(WorkbookError::DuplicateSheet {
                    name: sheet.name.clone(),
                });
            }
            match (parse_snapshot_name(&sheet.name), sheet.version) {
                (Some(n), Some(v)) if n == v => {}
                (Some(_), None) => {
                    return Err(WorkbookError::MissingVersion {
                        name: sheet.name.clone(),
                    })
                }
                (_, Some(v)) => {
                    return Err(WorkbookError::VersionMismatch {
                        name: sheet.name.clone(),
                        version: v,
                    })
                }
                (None, None) => {}
            }
        }
        Ok(())
    }

    /// Versions present, ascending
    pub fn snapshot_versions(&self) -> Vec<u32> {
        let mut versions: Vec<u32> = self.sheets.iter().filter_map(|s| s.version).collect();
        versions.sort_unstable();
        versions
    }

    pub fn snapshot(&self, version: u32) -> Option<Snapshot> {
        self.sheets
            .iter()
            .find(|s| s.version == Some(version))
            .and_then(Sheet::to_snapshot)
    }

    pub fn snapshot_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().filter(|s| s.is_snapshot())
    }

    /// Snapshot with the highest version
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.snapshot_versions()
            .last()
            .and_then(|v| self.snapshot(*v))
    }

    /// `max(version) + 1`, or 1 for an empty chain
    ///
    /// # Errors
    ///
    /// `Persistence` when the latest version is `u32::MAX`.
    pub fn next_version(&self) -> Result<u32> {
        match self.snapshot_versions().last() {
            None => Ok(1),
            Some(&latest) => latest
                .checked_add(1)
                .ok_or_else(|| WorkbookError::VersionsExhausted { latest }.into()),
        }
    }

    /// Append a snapshot sheet at the end of the workbook
    ///
    /// # Errors
    ///
    /// `Persistence` unless `snapshot.version` is exactly the next version.
    pub fn append_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let expected = self.next_version()?;
        if snapshot.version != expected {
            return Err(WorkbookError::OutOfOrder {
                version: snapshot.version,
                expected,
            }
            .into());
        }
        let sheet = Sheet::from_snapshot(snapshot);
        if self.sheets.iter().any(|s| s.name == sheet.name) {
            return Err(WorkbookError::DuplicateSheet { name: sheet.name }.into());
        }
        self.sheets.push(sheet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, version: Option<u32>) -> Sheet {
        Sheet {
            name: name.to_string(),
            version,
            created_at: None,
            content_digest: None,
            columns: Vec::new(),
            rows: Vec::new(),
            format: SheetFormat::default(),
            cell_formats: Vec::new(),
        }
    }

    #[test]
    fn test_next_version_of_empty_workbook_is_one() {
        assert_eq!(Workbook::new().next_version().unwrap(), 1);
    }

    #[test]
    fn test_versions_are_sorted_regardless_of_sheet_order() {
        let workbook = Workbook {
            format_version: FORMAT_VERSION,
            sheets: vec![sheet("V2", Some(2)), sheet("Notes", None), sheet("V1", Some(1))],
        };
        assert!(workbook.validate().is_ok());
        assert_eq!(workbook.snapshot_versions(), vec![1, 2]);
        assert_eq!(workbook.next_version().unwrap(), 3);
        assert_eq!(workbook.latest_snapshot().map(|s| s.version), Some(2));
    }

    #[test]
    fn test_leading_zero_sheet_is_not_a_snapshot() {
        let workbook = Workbook {
            format_version: FORMAT_VERSION,
            sheets: vec![sheet("V01", None)],
        };
        assert!(workbook.validate().is_ok());
        assert_eq!(workbook.next_version().unwrap(), 1);
    }

    #[test]
    fn test_last_possible_version_has_no_successor() {
        let workbook = Workbook {
            format_version: FORMAT_VERSION,
            sheets: vec![sheet("V4294967295", Some(u32::MAX))],
        };
        assert!(workbook.validate().is_ok());

        let err = workbook.next_version().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert!(err.to_string().contains("V4294967295"));
    }

    #[test]
    fn test_version_name_mismatch_is_rejected() {
        let workbook = Workbook {
            format_version: FORMAT_VERSION,
            sheets: vec![sheet("V3", Some(2))],
        };
        let err = workbook.validate().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidSheetName);
    }

    #[test]
    fn test_duplicate_sheet_names_are_rejected() {
        let workbook = Workbook {
            format_version: FORMAT_VERSION,
            sheets: vec![sheet("Notes", None), sheet("Notes", None)],
        };
        assert!(matches!(
            workbook.validate(),
            Err(WorkbookError::DuplicateSheet { .. })
        ));
    }

    #[test]
    fn test_append_must_extend_chain() {
        let mut workbook = Workbook::new();
        let mut snap = Snapshot::skeleton("Log_ID");
        snap.version = 2;
        let err = workbook.append_snapshot(&snap).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);

        snap.version = 1;
        workbook.append_snapshot(&snap).unwrap();
        assert_eq!(workbook.snapshot_versions(), vec![1]);
    }
}
