//! Stage-then-swap commit primitives
//!
//! The full new workbook is written to `<stem>_temp.<ext>` beside the
//! canonical file and then moved over it. When the canonical file cannot be
//! replaced (typically held open by a spreadsheet application), the staged
//! file is moved to `<stem>_V<n>_new.<ext>` instead and the commit is
//! reported as degraded.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::ffi::OsString;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// How the staged file replaces the canonical one
pub trait SwapStrategy {
    /// # Errors
    ///
    /// The underlying I/O error; `PermissionDenied` means the canonical file
    /// is blocked and the commit should be diverted.
    fn swap(&self, staged: &Path, canonical: &Path) -> io::Result<()>;
}

/// Plain `rename(2)`; atomic on the same filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameSwap;

impl SwapStrategy for RenameSwap {
    fn swap(&self, staged: &Path, canonical: &Path) -> io::Result<()> {
        fs::rename(staged, canonical)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped,
    Diverted { alternate: PathBuf, reason: String },
}

fn sibling(canonical: &Path, suffix: &str) -> PathBuf {
    let mut name = canonical
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = canonical.extension() {
        name.push(".");
        name.push(ext);
    }
    canonical.with_file_name(name)
}

/// `<stem>_temp.<ext>`
pub fn staging_path(canonical: &Path) -> PathBuf {
    sibling(canonical, "_temp")
}

/// `<stem>_V<n>_new.<ext>`, with a numeric suffix if that name is taken
pub fn alternate_path(canonical: &Path, version: u32) -> PathBuf {
    let base = sibling(canonical, &format!("_V{}_new", version));
    if !base.exists() {
        return base;
    }
    (2..)
        .map(|k| sibling(canonical, &format!("_V{}_new_{}", version, k)))
        .find(|p| !p.exists())
        .unwrap_or(base)
}

fn is_blocked(err: &io::Error) -> bool {
    err.kind() == ErrorKind::PermissionDenied
}

/// Write `content` to the staging path and swap it into `canonical`.
///
/// On any fatal failure the staged file is removed and the canonical file is
/// left as it was.
///
/// # Errors
///
/// `Io` when staging fails, when the swap fails for a reason other than a
/// blocked canonical file, or when the diversion itself fails. A failed
/// diversion carries the blocked swap as its source.
pub fn stage_and_swap(
    canonical: &Path,
    content: &[u8],
    version: u32,
    swap: &dyn SwapStrategy,
) -> Result<SwapOutcome> {
    let staged = staging_path(canonical);

    if let Err(e) = fs::write(&staged, content) {
        discard(&staged);
        return Err(io_error("write_staged", &staged, e));
    }

    match swap.swap(&staged, canonical) {
        Ok(()) => Ok(SwapOutcome::Swapped),
        Err(e) if is_blocked(&e) => {
            let alternate = alternate_path(canonical, version);
            match fs::rename(&staged, &alternate) {
                Ok(()) => {
                    tracing::warn!(
                        canonical = %canonical.display(),
                        alternate = %alternate.display(),
                        error = %e,
                        "canonical workbook blocked, commit diverted"
                    );
                    Ok(SwapOutcome::Diverted {
                        alternate,
                        reason: e.to_string(),
                    })
                }
                Err(divert_err) => {
                    discard(&staged);
                    Err(io_error("divert_staged", &alternate, divert_err)
                        .with_source(io_error("swap_staged", canonical, e)))
                }
            }
        }
        Err(e) => {
            discard(&staged);
            Err(io_error("swap_staged", canonical, e))
        }
    }
}

fn discard(staged: &Path) {
    if staged.exists() {
        if let Err(e) = fs::remove_file(staged) {
            tracing::warn!(staged = %staged.display(), error = %e, "failed to remove staged file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingSwap(ErrorKind);

    impl SwapStrategy for FailingSwap {
        fn swap(&self, _staged: &Path, _canonical: &Path) -> io::Result<()> {
            Err(io::Error::new(self.0, "swap refused"))
        }
    }

    #[test]
    fn test_path_helpers() {
        let canonical = Path::new("/data/book.json");
        assert_eq!(staging_path(canonical), PathBuf::from("/data/book_temp.json"));
        assert_eq!(
            alternate_path(canonical, 4),
            PathBuf::from("/data/book_V4_new.json")
        );
    }

    #[test]
    fn test_alternate_path_avoids_existing_file() {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().join("book.json");
        fs::write(dir.path().join("book_V2_new.json"), b"{}").unwrap();

        assert_eq!(
            alternate_path(&canonical, 2),
            dir.path().join("book_V2_new_2.json")
        );
    }

    #[test]
    fn test_swap_replaces_canonical_and_leaves_no_staged_file() {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().join("book.json");
        fs::write(&canonical, b"old").unwrap();

        let outcome = stage_and_swap(&canonical, b"new", 2, &RenameSwap).unwrap();

        assert_eq!(outcome, SwapOutcome::Swapped);
        assert_eq!(fs::read(&canonical).unwrap(), b"new");
        assert!(!staging_path(&canonical).exists());
    }

    #[test]
    fn test_blocked_swap_diverts() {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().join("book.json");
        fs::write(&canonical, b"old").unwrap();

        let outcome =
            stage_and_swap(&canonical, b"new", 2, &FailingSwap(ErrorKind::PermissionDenied))
                .unwrap();

        let alternate = dir.path().join("book_V2_new.json");
        assert!(matches!(outcome, SwapOutcome::Diverted { alternate: ref p, .. } if *p == alternate));
        assert_eq!(fs::read(&canonical).unwrap(), b"old");
        assert_eq!(fs::read(&alternate).unwrap(), b"new");
        assert!(!staging_path(&canonical).exists());
    }

    #[test]
    fn test_other_swap_failure_is_fatal_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().join("book.json");
        fs::write(&canonical, b"old").unwrap();

        let result = stage_and_swap(&canonical, b"new", 2, &FailingSwap(ErrorKind::Other));

        assert!(result.is_err());
        assert_eq!(fs::read(&canonical).unwrap(), b"old");
        assert!(!staging_path(&canonical).exists());
    }

    /// Loses the staged file, then reports the canonical file as blocked
    struct VanishingSwap;

    impl SwapStrategy for VanishingSwap {
        fn swap(&self, staged: &Path, _canonical: &Path) -> io::Result<()> {
            fs::remove_file(staged)?;
            Err(io::Error::new(ErrorKind::PermissionDenied, "file is open"))
        }
    }

    #[test]
    fn test_failed_divert_keeps_blocked_swap_as_source() {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().join("book.json");
        fs::write(&canonical, b"old").unwrap();

        let err = stage_and_swap(&canonical, b"new", 2, &VanishingSwap).unwrap_err();

        assert_eq!(err.op(), Some("divert_staged"));
        let source = err.source_error().unwrap();
        assert_eq!(source.op(), Some("swap_staged"));
        assert!(source.message().contains("file is open"));
        assert_eq!(fs::read(&canonical).unwrap(), b"old");
        assert!(!dir.path().join("book_V2_new.json").exists());
    }
}
