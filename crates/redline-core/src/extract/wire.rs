//! Pre-extracted change lists (the wire shape).
//!
//! ```json
//! [{"Log_ID": "A1", "column": "Status", "new_value": "Closed", "action": "ADD_UPDATE"}]
//! ```
//!
//! Records are validated into [`ChangeRecord`]s here, so nothing past this
//! boundary sees a loosely-shaped map.

use crate::errors::{RedlineError, Result};
use crate::model::{Action, ChangeRecord, ROW_TARGET};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field names accepted for the key when the configured key column is absent
const KEY_ALIASES: [&str; 2] = ["Log_ID", "key"];

#[derive(Debug, Clone, Deserialize)]
pub struct WireChangeRecord {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub new_value: Option<Value>,
    pub action: String,
    /// Key field plus, for whole-row records, the row content
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

/// Validate a wire-shape list, preserving order.
///
/// # Errors
///
/// `InvalidChangeRecord` (1-based index) for an unknown action, a missing
/// key, or a non-scalar value.
pub fn validate_wire_records(
    records: Vec<WireChangeRecord>,
    key_column: &str,
) -> Result<Vec<ChangeRecord>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| validate_one(record, i + 1, key_column))
        .collect()
}

fn validate_one(record: WireChangeRecord, index: usize, key_column: &str) -> Result<ChangeRecord> {
    let key_field = std::iter::once(key_column)
        .chain(KEY_ALIASES)
        .find(|name| record.rest.contains_key(*name));
    let key_text = key_field.and_then(|field| scalar_text(&record.rest[field]));
    let invalid = |reason: String| RedlineError::InvalidChangeRecord {
        index,
        key: key_text
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string),
        reason,
    };

    let action: Action = record
        .action
        .parse()
        .map_err(|_| invalid(format!("unknown action '{}'", record.action)))?;

    let key_field =
        key_field.ok_or_else(|| invalid(format!("missing key field '{}'", key_column)))?;
    let key = key_text
        .clone()
        .ok_or_else(|| invalid(format!("key field '{}' must be a scalar", key_field)))?;

    let column = record
        .column
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != ROW_TARGET);

    match column {
        Some(column) => {
            let new_value = match &record.new_value {
                Some(v) => scalar_text(v)
                    .ok_or_else(|| invalid("new_value must be a scalar".to_string()))?,
                None => String::new(),
            };
            Ok(ChangeRecord::cell(key, column, new_value, action))
        }
        None => {
            let mut fields = BTreeMap::new();
            for (name, value) in &record.rest {
                if name == key_field {
                    continue;
                }
                let text = scalar_text(value)
                    .ok_or_else(|| invalid(format!("field '{}' must be a scalar", name)))?;
                fields.insert(name.trim().to_string(), text.trim().to_string());
            }
            fields.insert(key_column.to_string(), key.trim().to_string());
            Ok(ChangeRecord::row(key, fields, action))
        }
    }
}

/// Text of a scalar JSON value; `null` reads as empty
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
