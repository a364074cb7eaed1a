//! The version chain: locking, commit and the `VersionStore` seam.

pub mod atomic;
pub mod lock;
pub mod locked;
pub mod memory;
pub mod traits;

pub use atomic::{
    alternate_path, stage_and_swap, staging_path, RenameSwap, SwapOutcome, SwapStrategy,
};
pub use lock::ChainLock;
pub use locked::LockedChain;
pub use memory::MemoryChain;
pub use traits::{ChainOptions, CommitResult, CommitStatus, SnapshotDraft, VersionStore};
