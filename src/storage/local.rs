//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_FILE: &str = "raycast_stats.json";

/// Snapshot stored as a JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    file_name: String,
}

impl LocalStorage {
    /// Create a LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_file_name(root_dir, DEFAULT_SNAPSHOT_FILE)
    }

    /// Create a LocalStorage with a custom snapshot file name.
    pub fn with_file_name(root_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root_dir.join(&self.file_name)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load(&self) -> Result<Snapshot> {
        let path = self.snapshot_path();
        match self.read_bytes(&path).await? {
            Some(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::corrupt_state(&path, e))?;
                log::debug!(
                    "Loaded snapshot with {} extensions from {}",
                    snapshot.len(),
                    path.display()
                );
                Ok(snapshot)
            }
            None => {
                log::warn!("No snapshot at {}, starting fresh", path.display());
                Ok(Snapshot::new())
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path();
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(&path, &bytes).await?;
        log::info!(
            "Snapshot: {} extensions written to {}",
            snapshot.len(),
            path.display()
        );
        Ok(())
    }
}
