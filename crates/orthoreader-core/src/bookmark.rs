//! Last-spoken-group bookmarks keyed by document file name.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

/// Identity of a document for bookmarking purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key to integer persistence port.
pub trait BookmarkStore {
    fn set(&mut self, key: &DocumentKey, group_idx: usize) -> Result<()>;
    fn get(&self, key: &DocumentKey) -> Result<Option<usize>>;
    fn remove(&mut self, key: &DocumentKey) -> Result<()>;
}

/// In-process store. Clones share the same map, so a test can keep a handle
/// and inspect what the controller wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookmarkStore {
    entries: Rc<RefCell<HashMap<DocumentKey, usize>>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl BookmarkStore for MemoryBookmarkStore {
    fn set(&mut self, key: &DocumentKey, group_idx: usize) -> Result<()> {
        self.entries.borrow_mut().insert(key.clone(), group_idx);
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn get(&self, key: &DocumentKey) -> Result<Option<usize>> {
        Ok(self.entries.borrow().get(key).copied())
    }

    fn remove(&mut self, key: &DocumentKey) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Adapter the playback controller talks to. Store failures are logged and
/// swallowed so persistence never blocks narration.
pub struct Bookmarks {
    store: Box<dyn BookmarkStore>,
    last_saved: Option<(DocumentKey, usize)>,
}

impl Bookmarks {
    pub fn new(store: Box<dyn BookmarkStore>) -> Self {
        Self {
            store,
            last_saved: None,
        }
    }

    pub fn save(&mut self, key: &DocumentKey, group_idx: usize) {
        if self
            .last_saved
            .as_ref()
            .is_some_and(|(saved_key, saved_idx)| saved_key == key && *saved_idx == group_idx)
        {
            return;
        }
        match self.store.set(key, group_idx) {
            Ok(()) => {
                debug!(document = %key, group_idx, "Saved bookmark");
                self.last_saved = Some((key.clone(), group_idx));
            }
            Err(err) => warn!(document = %key, group_idx, "Failed to save bookmark: {err}"),
        }
    }

    pub fn load(&self, key: &DocumentKey) -> Option<usize> {
        match self.store.get(key) {
            Ok(found) => found,
            Err(err) => {
                warn!(document = %key, "Failed to read bookmark: {err}");
                None
            }
        }
    }

    pub fn clear(&mut self, key: &DocumentKey) {
        if self.last_saved.as_ref().is_some_and(|(saved, _)| saved == key) {
            self.last_saved = None;
        }
        match self.store.remove(key) {
            Ok(()) => debug!(document = %key, "Cleared bookmark"),
            Err(err) => warn!(document = %key, "Failed to clear bookmark: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingStore;

    impl BookmarkStore for FailingStore {
        fn set(&mut self, _key: &DocumentKey, _group_idx: usize) -> Result<()> {
            Err(anyhow!("disk full"))
        }

        fn get(&self, _key: &DocumentKey) -> Result<Option<usize>> {
            Err(anyhow!("unreadable"))
        }

        fn remove(&mut self, _key: &DocumentKey) -> Result<()> {
            Err(anyhow!("read-only"))
        }
    }

    #[test]
    fn key_uses_file_name_only() {
        let a = DocumentKey::from_path(Path::new("/library/Austen/Emma.pdf"));
        let b = DocumentKey::from_path(Path::new("imports/Emma.pdf"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Emma.pdf");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_get_distinct_keys() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = DocumentKey::from_path(Path::new(OsStr::from_bytes(b"caf\xe9.pdf")));
        let b = DocumentKey::from_path(Path::new(OsStr::from_bytes(b"na\xefve.pdf")));
        assert_ne!(a, b);
        assert!(a.as_str().ends_with(".pdf"));
    }

    #[test]
    fn save_load_clear_round_trip() {
        let key = DocumentKey::from_path(Path::new("Emma.pdf"));
        let mut bookmarks = Bookmarks::new(Box::new(MemoryBookmarkStore::new()));

        bookmarks.save(&key, 3);
        assert_eq!(bookmarks.load(&key), Some(3));

        bookmarks.clear(&key);
        assert_eq!(bookmarks.load(&key), None);
    }

    #[test]
    fn repeated_save_of_same_value_writes_once() {
        let key = DocumentKey::from_path(Path::new("Emma.pdf"));
        let store = MemoryBookmarkStore::new();
        let mut bookmarks = Bookmarks::new(Box::new(store.clone()));

        bookmarks.save(&key, 2);
        bookmarks.save(&key, 2);
        assert_eq!(store.write_count(), 1);

        bookmarks.save(&key, 4);
        assert_eq!(store.write_count(), 2);
        assert_eq!(bookmarks.load(&key), Some(4));
    }

    #[test]
    fn save_after_clear_writes_again() {
        let key = DocumentKey::from_path(Path::new("Emma.pdf"));
        let store = MemoryBookmarkStore::new();
        let mut bookmarks = Bookmarks::new(Box::new(store.clone()));

        bookmarks.save(&key, 1);
        bookmarks.clear(&key);
        bookmarks.save(&key, 1);
        assert_eq!(store.write_count(), 2);
        assert_eq!(bookmarks.load(&key), Some(1));
    }

    #[test]
    fn store_failures_do_not_panic() {
        let key = DocumentKey::from_path(Path::new("Emma.pdf"));
        let mut bookmarks = Bookmarks::new(Box::new(FailingStore));
        bookmarks.save(&key, 1);
        assert_eq!(bookmarks.load(&key), None);
        bookmarks.clear(&key);
    }
}
