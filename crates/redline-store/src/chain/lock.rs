//! Exclusive lock on a workbook.
//!
//! The lock is a sibling file `<workbook>.lock` created with create-new
//! semantics. A second run finds it present and is rejected; nobody waits.
//! The file is removed when the guard drops. A run that dies without
//! dropping the guard leaves the file behind; it records the holder's pid so
//! the user can tell a stale lock from a live one.

#![allow(clippy::result_large_err)]

use crate::errors::{chain_locked, io_error, Result};
use chrono::Utc;
use redline_core_types::RunId;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ChainLock {
    path: PathBuf,
}

impl ChainLock {
    /// `<workbook>.lock` beside the workbook
    pub fn lock_path(canonical: &Path) -> PathBuf {
        let mut name = canonical
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        canonical.with_file_name(name)
    }

    /// Take the lock for `run_id`
    ///
    /// # Errors
    ///
    /// - `ChainLocked` if another run holds the lock
    /// - `Io` if the lock file cannot be created or written
    pub fn acquire(canonical: &Path, run_id: &RunId) -> Result<Self> {
        let path = Self::lock_path(canonical);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let content = fs::read_to_string(&path).unwrap_or_default();
                let run = lock_field(&content, "run_id").unwrap_or("<unknown>");
                let pid = lock_field(&content, "pid");
                return Err(chain_locked(canonical, &path, run, pid));
            }
            Err(e) => return Err(io_error("acquire_chain_lock", &path, e)),
        };

        // From here on the guard owns the file and removes it on any failure
        let lock = Self { path };
        writeln!(
            file,
            "pid={}\nrun_id={}\nacquired_at={}",
            std::process::id(),
            run_id,
            Utc::now().to_rfc3339()
        )
        .map_err(|e| io_error("acquire_chain_lock", &lock.path, e))?;

        tracing::debug!(lock = %lock.path.display(), run_id = %run_id, "chain lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_field<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    content
        .lines()
        .filter_map(|l| l.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
}

impl Drop for ChainLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release chain lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::errors::ExErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_appends_suffix() {
        assert_eq!(
            ChainLock::lock_path(Path::new("/data/book.json")),
            PathBuf::from("/data/book.json.lock")
        );
    }

    #[test]
    fn test_second_acquire_is_rejected() {
        let dir = TempDir::new().unwrap();
        let book = dir.path().join("book.json");
        let first = RunId::new();

        let _guard = ChainLock::acquire(&book, &first).unwrap();
        let err = ChainLock::acquire(&book, &RunId::new()).unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ChainLocked);
        assert!(err.message().contains(first.as_str()));
        assert!(err
            .message()
            .contains(&format!("pid {}", std::process::id())));
    }

    #[test]
    fn test_leftover_lock_message_names_file_to_remove() {
        // GIVEN a lock file left behind by a run that died
        let dir = TempDir::new().unwrap();
        let book = dir.path().join("book.json");
        let lock_file = ChainLock::lock_path(&book);
        fs::write(&lock_file, "pid=4242\nrun_id=run-crashed\n").unwrap();

        // WHEN another run tries to take the lock
        let err = ChainLock::acquire(&book, &RunId::new()).unwrap_err();

        // THEN the message names the holder and how to recover
        let message = err.message();
        assert!(message.contains("run run-crashed (pid 4242)"));
        assert!(message.contains(&format!("remove {}", lock_file.display())));

        // AND the lock file is left for the user to inspect
        assert!(lock_file.exists());
    }

    #[test]
    fn test_drop_releases_lock() {
        let dir = TempDir::new().unwrap();
        let book = dir.path().join("book.json");

        let guard = ChainLock::acquire(&book, &RunId::new()).unwrap();
        let lock_file = guard.path().to_path_buf();
        assert!(lock_file.exists());
        drop(guard);

        assert!(!lock_file.exists());
        assert!(ChainLock::acquire(&book, &RunId::new()).is_ok());
    }
}
