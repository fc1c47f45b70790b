//! Snapshot persistence.
//!
//! A single JSON file holds the download counts observed by the last
//! successful run. It is read at the start of a run and replaced as the very
//! last step, so a failed run leaves the previous snapshot untouched.
//!
//! ## Directory Structure
//!
//! ```text
//! {storage_dir}/
//! ├── config.toml           # Optional settings
//! └── raycast_stats.json    # Snapshot: {"extension-name": downloads, ...}
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last snapshot. A missing snapshot is an empty one.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the stored snapshot with `snapshot`.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
