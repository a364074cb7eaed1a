//! Redline Store - the versioned workbook on disk
//!
//! Provides:
//! - Workbook file format (JSON) holding snapshot sheets `V1`, `V2`, … and
//!   any other sheets, which commits preserve
//! - Chain lock guarding one merge-and-commit per workbook
//! - Stage-then-swap commit with a degraded fallback path
//! - `VersionStore` trait with file-backed and in-memory chains
//! - Readers for source tables, change lists and `redline.toml`

pub mod chain;
pub mod errors;
pub mod source;
pub mod workbook;

// Re-export key types
pub use chain::{
    ChainLock, ChainOptions, CommitResult, CommitStatus, LockedChain, MemoryChain, RenameSwap,
    SnapshotDraft, SwapStrategy, VersionStore,
};
pub use errors::Result;
pub use workbook::{Sheet, Workbook};
