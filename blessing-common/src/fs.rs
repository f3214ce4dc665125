//! Atomic file writes
//!
//! Documents are written to `<target>.tmp` and renamed over the target, so a
//! crash mid-write leaves either the old document or the new one, never a
//! truncated file.

use crate::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Write `bytes` to `target` atomically (temp file + rename)
///
/// Parent directories are created when missing.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp = temp_path_for(target);
    {
        let mut file = std::fs::File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }

    tracing::debug!(path = %target.display(), bytes = bytes.len(), "Wrote file atomically");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_appends_suffix() {
        let temp = temp_path_for(Path::new("/data/blessings.json"));
        assert_eq!(temp, PathBuf::from("/data/blessings.json.tmp"));
    }

    #[test]
    fn test_write_atomic_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("doc.json");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
        assert!(!dir.path().join("doc.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("out").join("progress.json");

        write_atomic(&target, b"{}").unwrap();

        assert!(target.exists());
    }
}
