//! Persisted local key-value store
//!
//! The browser-profile equivalent: synchronous string keys to string values.
//! Writers own their keys; see [`keys`].

use crate::error::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Well-known store keys
pub mod keys {
    /// Bearer token written by sign-in
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const USER_ID: &str = "user_id";
    pub const USER_NAME: &str = "user_name";
    pub const USER_ROLE: &str = "user_role";

    /// Owned exclusively by the history cache
    pub const READ_HISTORY: &str = "read_history";
}

/// Abstract local store
/// Reads and writes are synchronous and atomic per call
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: String) -> StoreResult<()>;

    /// Delete `key`; succeeds if it was absent
    fn remove(&self, key: &str) -> StoreResult<()>;
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

/// In-memory store (for testing and ephemeral sessions)
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.data.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.data
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.data.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object per data directory
pub struct FileStore {
    path: PathBuf,
    data: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// File name used inside the data directory
    pub const FILE_NAME: &'static str = "local_store.json";

    /// Open (or create) the store under `dir`
    ///
    /// A corrupt store file is logged and replaced by an empty store
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);

        let data = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("Failed to parse {:?}, starting fresh: {}", path, e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole map through a temp file and rename
    fn persist(&self, data: &HashMap<String, String>) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(data)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, text)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.data.read().map_err(poisoned)?.get(key).cloned())
    }

    // The map only changes once the new contents are on disk
    fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        let mut updated = data.clone();
        updated.insert(key.to_string(), value);
        self.persist(&updated)?;
        *data = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        if !data.contains_key(key) {
            return Ok(());
        }
        let mut updated = data.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *data = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();

        store.set("k", "hello".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("hello"));
        assert_eq!(store.get("missing").unwrap(), None);

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        // Removing an absent key is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set(keys::ACCESS_TOKEN, "tok".to_string()).unwrap();
            store.set("other", "x".to_string()).unwrap();
            store.remove("other").unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok"));
        assert_eq!(store.get("other").unwrap(), None);
        assert!(!dir.path().join("local_store.json.tmp").exists());
    }

    #[test]
    fn test_file_store_failed_write_keeps_old_value() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set(keys::ACCESS_TOKEN, "old".to_string()).unwrap();
        store.set(keys::USER_NAME, "Ada".to_string()).unwrap();

        // Nowhere left to write
        std::fs::remove_dir_all(dir.path()).unwrap();

        assert!(store.set(keys::ACCESS_TOKEN, "new".to_string()).is_err());
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("old"));

        assert!(store.remove(keys::USER_NAME).is_err());
        assert_eq!(store.get(keys::USER_NAME).unwrap().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(FileStore::FILE_NAME), "{not json").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get(keys::READ_HISTORY).unwrap(), None);

        store.set("k", "v".to_string()).unwrap();
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }
}
