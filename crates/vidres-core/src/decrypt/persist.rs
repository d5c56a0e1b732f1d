//! Persist the transform cache to disk (JSON under XDG state dir) so derived
//! transforms survive across runs. Correctness never depends on this file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::cache::TransformCache;
use super::transform::DescramblingTransform;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTransforms {
    version: u32,
    transforms: BTreeMap<String, DescramblingTransform>,
}

impl TransformCache {
    /// Default path for the cache file: `~/.local/state/vidres/transforms.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vidres")?;
        Ok(xdg_dirs.get_state_home().join("transforms.json"))
    }

    /// Save all entries to the given path (creates parent dir if needed).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let persisted = PersistedTransforms {
            version: FORMAT_VERSION,
            transforms: self.snapshot(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&persisted).context("serialize transform cache")?;
        std::fs::write(path, json)
            .with_context(|| format!("write transform cache: {}", path.display()))?;
        Ok(())
    }

    /// Load entries from the given path into this cache; existing tags are kept.
    /// Returns the number of entries read, or `None` if the file does not exist.
    pub fn load_from_path(&self, path: &Path) -> Result<Option<usize>> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read transform cache: {}", path.display()))
            }
        };
        let persisted: PersistedTransforms = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse transform cache: {}", path.display()))?;
        if persisted.version != FORMAT_VERSION {
            tracing::warn!(
                version = persisted.version,
                "ignoring transform cache with unknown format version"
            );
            return Ok(Some(0));
        }
        let n = persisted.transforms.len();
        self.extend_from_snapshot(persisted.transforms);
        Ok(Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decrypt::TransformOp;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("transforms.json");

        let cache = TransformCache::new();
        cache.insert(
            "-vflXyz",
            DescramblingTransform::new(vec![TransformOp::Swap(2), TransformOp::Slice(1)]),
        );
        cache.save_to_path(&path).unwrap();

        let loaded = TransformCache::new();
        assert_eq!(loaded.load_from_path(&path).unwrap(), Some(1));
        assert_eq!(
            loaded.get("-vflXyz").unwrap().ops(),
            &[TransformOp::Swap(2), TransformOp::Slice(1)]
        );
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TransformCache::new();
        assert_eq!(cache.load_from_path(&dir.path().join("nope.json")).unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transforms.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(TransformCache::new().load_from_path(&path).is_err());
    }
}
