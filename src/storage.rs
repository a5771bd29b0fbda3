//! Key-value persistence substrates for the credential store.
//!
//! The credential store only needs string get/set/remove; anything that can
//! provide that (browser storage bridge, keychain, a file) plugs in through
//! [`KeyValueStorage`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Error;

/// Persistent string key-value storage.
///
/// # Example
///
/// ```rust,ignore
/// impl KeyValueStorage for BrowserStorage {
///     fn get(&self, key: &str) -> Result<Option<String>, Error> {
///         self.local_storage.get_item(key).map_err(|e| Error::Storage(e.to_string()))
///     }
///     // ...
/// }
/// ```
pub trait KeyValueStorage: Send + Sync + 'static {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process storage. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// The file survives process restarts. A missing or unparsable file reads as
/// empty; the next write replaces it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, Error> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(Error::Storage(format!("{}: {e}", self.path.display())));
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable storage file");
                Ok(HashMap::new())
            }
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string(entries)?;
        // write-then-rename: readers never observe a truncated file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| Error::Storage(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let _guard = lock(&self.guard);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let _guard = lock(&self.guard);
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let _guard = lock(&self.guard);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStorage::new(&path).set("auth_token", "tok-1").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn file_storage_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("auth_token").unwrap(), None);
        storage.remove("auth_token").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn file_storage_garbage_file_reads_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("user").unwrap(), None);

        storage.set("user", "{}").unwrap();
        assert_eq!(storage.get("user").unwrap().as_deref(), Some("{}"));
    }
}
