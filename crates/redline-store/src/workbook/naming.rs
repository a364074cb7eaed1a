//! Snapshot sheet names: `V` followed by a positive integer, no leading zeros.

use redline_core::errors::RedlineError;

/// Version encoded in a snapshot sheet name, `None` for any other sheet
pub fn parse_snapshot_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('V')?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

/// Like [`parse_snapshot_name`], but an error for non-snapshot names
///
/// # Errors
///
/// `InvalidSheetName` when `name` is not `V<positive integer>`.
pub fn validate_snapshot_name(name: &str) -> Result<u32, RedlineError> {
    parse_snapshot_name(name).ok_or_else(|| RedlineError::InvalidSheetName {
        name: name.to_string(),
    })
}

pub fn snapshot_name(version: u32) -> String {
    format!("V{}", version)
}
