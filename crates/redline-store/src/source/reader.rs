//! Source tables, change lists and configuration files
//!
//! Source tables and change lists are JSON or YAML, chosen by extension
//! (`.yaml`/`.yml` → YAML, anything else → JSON).

#![allow(clippy::result_large_err)]

use crate::errors::{input_missing, invalid_input, Result};
use redline_core::config::{RedlineConfig, DEFAULT_CONFIG_FILE};
use redline_core::errors::ExError;
use redline_core::extract::{validate_wire_records, WireChangeRecord};
use redline_core::model::{ChangeRecord, SourceTable};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Json,
        }
    }
}

fn read_document<T: DeserializeOwned>(path: &Path, op: &str) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| input_missing(op, path, e))?;
    match SourceFormat::from_path(path) {
        SourceFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| invalid_input(op, path, format!("YAML parse error: {}", e))),
        SourceFormat::Json => serde_json::from_str(&content)
            .map_err(|e| invalid_input(op, path, format!("JSON parse error: {}", e))),
    }
}

/// Read the table handed over by the document reader
///
/// # Errors
///
/// `InputMissing` if the file cannot be read, `InvalidInput` if it does not
/// parse as a source table.
pub fn read_source_table(path: &Path) -> Result<SourceTable> {
    let table: SourceTable = read_document(path, "read_source_table")?;
    tracing::debug!(
        source = %path.display(),
        row_count = table.rows.len(),
        "source table read"
    );
    Ok(table)
}

/// Read and validate a wire-shape change list
///
/// # Errors
///
/// `InputMissing` / `InvalidInput` as for [`read_source_table`], and
/// `InvalidChangeRecord` for a record that fails validation.
pub fn read_change_records(path: &Path, key_column: &str) -> Result<Vec<ChangeRecord>> {
    let wire: Vec<WireChangeRecord> = read_document(path, "read_change_records")?;
    validate_wire_records(wire, key_column).map_err(|e| ExError::from(e).with_path(path))
}

/// Load `redline.toml` from an explicit path
///
/// # Errors
///
/// `InputMissing` if the file cannot be read, `InvalidConfig` if it does not
/// validate.
pub fn load_config(path: &Path) -> Result<RedlineConfig> {
    let content = fs::read_to_string(path).map_err(|e| input_missing("load_config", path, e))?;
    RedlineConfig::from_toml_str(&content).map_err(|e| ExError::from(e).with_path(path))
}

/// Explicit path if given, else `redline.toml` in `dir` if present, else
/// defaults
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_or_default(explicit: Option<&Path>, dir: &Path) -> Result<RedlineConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let implicit = dir.join(DEFAULT_CONFIG_FILE);
    if implicit.is_file() {
        load_config(&implicit)
    } else {
        Ok(RedlineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.yaml")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(Path::new("a.YML")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a")), SourceFormat::Json);
    }
}
