//! The table handed over by the document reader.
//!
//! The reader itself is outside this workspace; it produces a header and
//! rows of cells, each cell carrying its text and the color of its first
//! highlighted run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    pub header: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<SourceCell>>,
}

/// One source cell. Accepts either `{text, highlight}` or a bare string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CellRepr")]
pub struct SourceCell {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Text(String),
    Full {
        #[serde(default)]
        text: String,
        #[serde(default)]
        highlight: Option<String>,
    },
}

impl From<CellRepr> for SourceCell {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Text(text) => SourceCell {
                text,
                highlight: None,
            },
            CellRepr::Full { text, highlight } => SourceCell { text, highlight },
        }
    }
}

impl SourceCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: None,
        }
    }

    pub fn highlighted(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: Some(color.into()),
        }
    }

    /// Highlight token, ignoring blank strings
    pub fn highlight(&self) -> Option<&str> {
        self.highlight
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

impl SourceTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<SourceCell>) {
        self.rows.push(cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_string_cells_deserialize() {
        let json = r#"{"header": ["Log_ID"], "rows": [["A1", {"text": "B2", "highlight": "RED"}]]}"#;
        let table: SourceTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.rows[0][0], SourceCell::plain("A1"));
        assert_eq!(table.rows[0][1].highlight(), Some("RED"));
    }

    #[test]
    fn test_blank_highlight_is_absent() {
        let cell = SourceCell::highlighted("x", "  ");
        assert_eq!(cell.highlight(), None);
    }
}
