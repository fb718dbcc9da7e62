//! On-disk bookmark store.
//!
//! Each document gets a directory under the cache root named by a hash of its
//! key, holding a tiny TOML file with a single `group_idx` field.

use crate::bookmark::{BookmarkStore, DocumentKey};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".cache";

#[derive(serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    group_idx: usize,
}

#[derive(Debug, Clone)]
pub struct FileBookmarkStore {
    root: PathBuf,
}

impl FileBookmarkStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bookmark_path(&self, key: &DocumentKey) -> PathBuf {
        hash_dir(&self.root, key).join("bookmark.toml")
    }
}

impl Default for FileBookmarkStore {
    fn default() -> Self {
        Self::new(CACHE_DIR)
    }
}

impl BookmarkStore for FileBookmarkStore {
    fn set(&mut self, key: &DocumentKey, group_idx: usize) -> Result<()> {
        let path = self.bookmark_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating cache dir {}", parent.display()))?;
        }
        let contents = toml::to_string(&CacheEntry { group_idx })?;
        fs::write(&path, contents).with_context(|| format!("Writing {}", path.display()))?;
        Ok(())
    }

    fn get(&self, key: &DocumentKey) -> Result<Option<usize>> {
        let path = self.bookmark_path(key);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Reading {}", path.display()));
            }
        };
        let entry: CacheEntry =
            toml::from_str(&data).with_context(|| format!("Parsing {}", path.display()))?;
        Ok(Some(entry.group_idx))
    }

    fn remove(&mut self, key: &DocumentKey) -> Result<()> {
        let path = self.bookmark_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("Removing {}", path.display())),
        }
    }
}

pub fn hash_dir(root: &Path, key: &DocumentKey) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(key.as_str().as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    root.join(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn scratch_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let nonce = SEQ.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "orthoreader-cache-test-{}-{nonce}",
            std::process::id()
        ))
    }

    #[test]
    fn persists_across_store_instances() {
        let root = scratch_dir();
        let key = DocumentKey::from_path(Path::new("Confessions.pdf"));

        let mut store = FileBookmarkStore::new(&root);
        store.set(&key, 12).unwrap();

        let reopened = FileBookmarkStore::new(&root);
        assert_eq!(reopened.get(&key).unwrap(), Some(12));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_and_removed_entries_read_as_absent() {
        let root = scratch_dir();
        let key = DocumentKey::from_path(Path::new("City of God.pdf"));
        let mut store = FileBookmarkStore::new(&root);

        assert_eq!(store.get(&key).unwrap(), None);
        store.remove(&key).unwrap();

        store.set(&key, 5).unwrap();
        store.remove(&key).unwrap();
        assert_eq!(store.get(&key).unwrap(), None);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn hash_dir_is_stable_per_key() {
        let root = Path::new(CACHE_DIR);
        let a = DocumentKey::from_path(Path::new("x/Emma.pdf"));
        let b = DocumentKey::from_path(Path::new("y/Emma.pdf"));
        assert_eq!(hash_dir(root, &a), hash_dir(root, &b));
    }
}
