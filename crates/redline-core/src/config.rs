//! Run configuration (`redline.toml`).
//!
//! Every field has a default, so an empty file (or no file) yields the
//! standard behavior: key column `Log_ID`, cell-level extraction and the
//! RED/PINK color vocabulary.

use crate::errors::{RedlineError, Result};
use crate::model::snapshot::DEFAULT_COLUMN_WIDTH;
use crate::model::Action;
use crate::rules::ColorRuleMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "redline.toml";

/// How highlights are turned into change records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// One record per highlighted row
    Row,
    /// One record per highlighted cell
    #[default]
    Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub added_fill: String,
    pub updated_fill: String,
    pub deleted_fill: String,
    pub default_column_width: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            added_fill: "FFC6EFCE".to_string(),
            updated_fill: "FFFFEB9C".to_string(),
            deleted_fill: "FFFFC7CE".to_string(),
            default_column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedlineConfig {
    pub key_column: String,
    pub mode: ExtractionMode,
    /// Vocabulary token → action name
    pub colors: BTreeMap<String, String>,
    /// Raw reader token → vocabulary token
    pub color_aliases: BTreeMap<String, String>,
    pub audit: AuditConfig,
}

impl Default for RedlineConfig {
    fn default() -> Self {
        Self {
            key_column: "Log_ID".to_string(),
            mode: ExtractionMode::default(),
            colors: ColorRuleMap::standard_rules()
                .into_iter()
                .map(|(token, action)| (token, action.as_str().to_string()))
                .collect(),
            color_aliases: ColorRuleMap::standard_aliases(),
            audit: AuditConfig::default(),
        }
    }
}

impl RedlineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, an empty key column or an action
    /// name outside the closed vocabulary.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RedlineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `InvalidConfig` when the key column is blank or a color maps to an
    /// unknown action.
    pub fn validate(&self) -> Result<()> {
        if self.key_column.trim().is_empty() {
            return Err(RedlineError::InvalidConfig {
                reason: "key_column must not be empty".to_string(),
            });
        }
        self.color_rules().map(|_| ())
    }

    /// Build the color rule map described by this config
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first color whose action does not parse.
    pub fn color_rules(&self) -> Result<ColorRuleMap> {
        let mut rules = BTreeMap::new();
        for (token, action) in &self.colors {
            let parsed: Action = action.parse().map_err(|_| RedlineError::InvalidConfig {
                reason: format!("color '{}' maps to unknown action '{}'", token, action),
            })?;
            rules.insert(token.clone(), parsed);
        }
        Ok(ColorRuleMap::new(rules, self.color_aliases.clone()))
    }

    pub fn key_column(&self) -> &str {
        self.key_column.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = RedlineConfig::from_toml_str("").unwrap();
        assert_eq!(config, RedlineConfig::default());
        assert_eq!(config.mode, ExtractionMode::Cell);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = RedlineConfig::from_toml_str(
            r#"
            key_column = "Component_ID"
            mode = "row"

            [colors]
            GREEN = "ADD_UPDATE"

            [audit]
            added_fill = "FF00FF00"
            "#,
        )
        .unwrap();
        assert_eq!(config.key_column(), "Component_ID");
        assert_eq!(config.mode, ExtractionMode::Row);
        assert_eq!(config.audit.added_fill, "FF00FF00");
        assert_eq!(config.audit.updated_fill, AuditConfig::default().updated_fill);

        let rules = config.color_rules().unwrap();
        assert_eq!(rules.action_for(Some("GREEN")), Action::AddUpdate);
        assert_eq!(rules.action_for(Some("RED")), Action::None);
    }

    #[test]
    fn test_unknown_action_is_invalid_config() {
        let err = RedlineConfig::from_toml_str("[colors]\nRED = \"UPSERT\"\n").unwrap_err();
        assert!(matches!(err, RedlineError::InvalidConfig { .. }));
    }

    #[test]
    fn test_blank_key_column_is_rejected() {
        let err = RedlineConfig::from_toml_str("key_column = \"  \"").unwrap_err();
        assert!(matches!(err, RedlineError::InvalidConfig { .. }));
    }
}
