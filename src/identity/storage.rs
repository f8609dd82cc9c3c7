use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Client-local key/value storage, the way a browser's `localStorage` is
/// used: string keys, string values, no expiry.
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage that lives as long as the value does. Used in tests and for
/// sessions that should not persist.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON file holding one origin's items. Every read goes back to disk, so
/// two handles on the same file see each other's writes on their next read;
/// concurrent writers are last-write-wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut items) => items.remove(key),
            Err(e) => {
                log::warn!("Ignoring unreadable storage {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// A corrupt file already reads as empty, so writing starts over from an
    /// empty map instead of failing every time.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(StorageError::Corrupt(e)) => {
                log::warn!("Replacing corrupt storage {}: {}", self.path.display(), e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&items)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k"), None);
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_storage_is_shared_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("origin").join("storage.json");

        let first = FileStorage::new(&path);
        let second = FileStorage::new(&path);
        assert_eq!(first.get_item("blog_author_id"), None);

        first.set_item("blog_author_id", "author_aaaa").unwrap();
        first.set_item("theme", "dark").unwrap();
        assert_eq!(second.get_item("blog_author_id").as_deref(), Some("author_aaaa"));

        second.set_item("blog_author_id", "author_bbbb").unwrap();
        assert_eq!(first.get_item("blog_author_id").as_deref(), Some("author_bbbb"));
        assert_eq!(first.get_item("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get_item("blog_author_id"), None);
        storage.set_item("blog_author_id", "author_x").unwrap();
        assert_eq!(storage.get_item("blog_author_id").as_deref(), Some("author_x"));
    }

    #[test]
    fn test_identity_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let mut identity = crate::identity::PseudoIdentity::mount(FileStorage::new(&path));
        let id = identity.ensure("ana@example.com").unwrap();
        assert_eq!(
            FileStorage::new(&path).get_item(crate::identity::AUTHOR_ID_STORAGE_KEY),
            Some(id)
        );
    }
}
