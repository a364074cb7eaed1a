use super::action::Action;
use serde::Serialize;
use std::collections::BTreeMap;

/// Wire spelling of the whole-row target
pub const ROW_TARGET: &str = "*row*";

/// What a change record addresses inside the matched rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The whole row
    Row,
    /// A single named column
    Cell(String),
}

impl Target {
    /// Column name, or `*row*` for whole-row records
    pub fn label(&self) -> &str {
        match self {
            Target::Row => ROW_TARGET,
            Target::Cell(column) => column,
        }
    }
}

/// One edit extracted from the source table.
///
/// Records live for a single run: they are produced by extraction (or by
/// validating a wire-shape list) and consumed once by the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    /// Value of the key column (trimmed); empty keys never match
    pub key: String,
    pub target: Target,
    /// Cell text for single-cell records; unused for whole-row records
    pub new_value: String,
    /// Row content for whole-row records, empty for single-cell records
    pub fields: BTreeMap<String, String>,
    pub action: Action,
}

impl ChangeRecord {
    pub fn cell(
        key: impl Into<String>,
        column: impl Into<String>,
        new_value: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            key: key.into().trim().to_string(),
            target: Target::Cell(column.into()),
            new_value: new_value.into(),
            fields: BTreeMap::new(),
            action,
        }
    }

    pub fn row(key: impl Into<String>, fields: BTreeMap<String, String>, action: Action) -> Self {
        Self {
            key: key.into().trim().to_string(),
            target: Target::Row,
            new_value: String::new(),
            fields,
            action,
        }
    }

    pub fn is_whole_row(&self) -> bool {
        matches!(self.target, Target::Row)
    }

    /// Flat view used by previews and `--json` output
    pub fn to_wire(&self) -> WireView {
        WireView {
            key: self.key.clone(),
            column: self.target.label().to_string(),
            new_value: self.new_value.clone(),
            action: self.action,
            fields: self.fields.clone(),
        }
    }
}

/// Serializable projection of a record in the wire shape
#[derive(Debug, Clone, Serialize)]
pub struct WireView {
    #[serde(rename = "Log_ID")]
    pub key: String,
    pub column: String,
    pub new_value: String,
    pub action: Action,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}
