//! Highlight-color rules.

pub mod color_rules;

pub use color_rules::ColorRuleMap;
