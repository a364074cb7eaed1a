//! Mapping from highlight color to merge action.
//!
//! Lookup is two-step: the raw token reported by the document reader is
//! first resolved through the alias table (`FFFF0000` → `RED`), then the
//! resulting vocabulary token is looked up in the rule table. Anything that
//! does not resolve maps to [`Action::None`].

use crate::model::Action;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorRuleMap {
    rules: BTreeMap<String, Action>,
    aliases: BTreeMap<String, String>,
}

/// Normalized form of a color token: trimmed, uppercase, no leading `#`
pub fn normalize_token(token: &str) -> String {
    token.trim().trim_start_matches('#').to_ascii_uppercase()
}

impl ColorRuleMap {
    /// Build a map from explicit rules and aliases. Tokens are normalized.
    pub fn new(rules: BTreeMap<String, Action>, aliases: BTreeMap<String, String>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(token, action)| (normalize_token(&token), action))
                .collect(),
            aliases: aliases
                .into_iter()
                .map(|(raw, token)| (normalize_token(&raw), normalize_token(&token)))
                .collect(),
        }
    }

    /// `RED → ADD_UPDATE`, `PINK → DELETE`, plus the hex fallbacks some
    /// readers report instead of the named highlight.
    pub fn standard() -> Self {
        Self::new(Self::standard_rules(), Self::standard_aliases())
    }

    pub fn standard_rules() -> BTreeMap<String, Action> {
        BTreeMap::from([
            ("RED".to_string(), Action::AddUpdate),
            ("PINK".to_string(), Action::Delete),
        ])
    }

    pub fn standard_aliases() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("FFFF0000".to_string(), "RED".to_string()),
            ("FF0000".to_string(), "RED".to_string()),
            ("FFC0CB".to_string(), "PINK".to_string()),
            ("FFFFC0CB".to_string(), "PINK".to_string()),
        ])
    }

    /// Vocabulary token for a raw color, after alias resolution
    pub fn resolve(&self, color: &str) -> String {
        let token = normalize_token(color);
        self.aliases.get(&token).cloned().unwrap_or(token)
    }

    /// Action for a highlight color; absent or unmapped colors are NONE
    pub fn action_for(&self, color: Option<&str>) -> Action {
        match color {
            Some(c) if !c.trim().is_empty() => self
                .rules
                .get(&self.resolve(c))
                .copied()
                .unwrap_or(Action::None),
            _ => Action::None,
        }
    }

    pub fn rules(&self) -> &BTreeMap<String, Action> {
        &self.rules
    }
}

impl Default for ColorRuleMap {
    fn default() -> Self {
        Self::standard()
    }
}
