use crate::errors::RedlineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a highlight asks the merge to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Create the row/cell, or overwrite it if the key already exists
    AddUpdate,
    /// Remove the row (whole-row) or clear the cell (single-cell)
    Delete,
    /// Inert; never changes a snapshot
    None,
}

impl Action {
    /// Wire spelling of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddUpdate => "ADD_UPDATE",
            Action::Delete => "DELETE",
            Action::None => "NONE",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }
}

impl FromStr for Action {
    type Err = RedlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADD_UPDATE" => Ok(Action::AddUpdate),
            "DELETE" => Ok(Action::Delete),
            "NONE" => Ok(Action::None),
            _ => Err(RedlineError::UnknownAction {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
