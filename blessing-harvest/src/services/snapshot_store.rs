//! Snapshot and progress persistence
//!
//! Both documents are pretty-printed UTF-8 JSON (non-ASCII unescaped) written
//! atomically. A missing document loads as `None`; an unreadable or
//! malformed one is an error so a resume never silently overwrites data it
//! could not read.

use crate::models::{BucketGrid, ComboProgress, LoadedSnapshot, SnapshotDocument};
use blessing_common::config::RootFolderInitializer;
use blessing_common::fs::write_atomic;
use blessing_common::Result;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshot_path: PathBuf,
    progress_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(snapshot_path: PathBuf, progress_path: PathBuf) -> Self {
        Self {
            snapshot_path,
            progress_path,
        }
    }

    /// Standard file names inside the root folder
    pub fn in_root_folder(initializer: &RootFolderInitializer) -> Self {
        Self::new(initializer.snapshot_path(), initializer.progress_path())
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    /// Write the full grid with a fresh `generated_at` timestamp
    pub fn save_snapshot(&self, grid: &BucketGrid) -> Result<()> {
        let generated_at = chrono::Local::now().to_rfc3339();
        let document = SnapshotDocument::new(grid, generated_at);
        let bytes = serde_json::to_vec_pretty(&document)?;
        write_atomic(&self.snapshot_path, &bytes)?;
        debug!(
            path = %self.snapshot_path.display(),
            total = document.metadata.total_count,
            "Snapshot saved"
        );
        Ok(())
    }

    pub fn save_progress(&self, progress: &ComboProgress) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(progress)?;
        write_atomic(&self.progress_path, &bytes)?;
        debug!(
            path = %self.progress_path.display(),
            completed = progress.completed_count(),
            "Progress saved"
        );
        Ok(())
    }

    pub fn load_snapshot(&self) -> Result<Option<LoadedSnapshot>> {
        let loaded: Option<LoadedSnapshot> = read_json(&self.snapshot_path)?;
        if let Some(snapshot) = &loaded {
            info!(
                path = %self.snapshot_path.display(),
                generated_at = snapshot.metadata.as_ref().map(|m| m.generated_at.as_str()).unwrap_or("unknown"),
                "Loaded snapshot"
            );
        }
        Ok(loaded)
    }

    pub fn load_progress(&self) -> Result<Option<ComboProgress>> {
        read_json(&self.progress_path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}
