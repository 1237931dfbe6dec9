//! Persistent key-value storage.
//!
//! Plays the role of browser local storage: a flat map of string keys to
//! string values that survives restarts. The credential lives under
//! [`CREDENTIAL_KEY`]; the theme collaborator uses [`THEME_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{StorageError, StorageResult};

/// Key holding the raw credential string.
pub const CREDENTIAL_KEY: &str = "token";

/// Key holding the display theme preference.
pub const THEME_KEY: &str = "themeMode";

/// Default storage file name within the data directory.
pub const STORAGE_FILE: &str = "storage.json";

/// Persistent string map.
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Read a value.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

// ============================================================================
// FileStorage
// ============================================================================

/// Storage backed by a JSON object file.
///
/// Every mutation rewrites the whole file through a temporary sibling and a
/// rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStorage {
    /// Storage at `<data_dir>/storage.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(STORAGE_FILE))
    }

    /// Storage at an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Get the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Current map as the base for a mutation, and whether the file was
    /// corrupt. A corrupt file is replaced rather than left blocking every
    /// later write.
    async fn read_map_for_update(&self) -> StorageResult<(BTreeMap<String, String>, bool)> {
        match self.read_map().await {
            Ok(map) => Ok((map, false)),
            Err(StorageError::Corrupt { path, message }) => {
                tracing::warn!(%path, %message, "storage file is corrupt, starting over");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        let io_err = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(map).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let (mut map, _) = self.read_map_for_update().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await?;
        tracing::debug!(key, path = %self.path.display(), "storage entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let (mut map, repaired) = self.read_map_for_update().await?;
        if map.remove(key).is_some() || repaired {
            self.write_map(&map).await?;
            tracing::debug!(key, path = %self.path.display(), "storage entry removed");
        }
        Ok(())
    }
}

// ============================================================================
// MemoryStorage (for testing)
// ============================================================================

/// In-memory storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one entry already present.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Synchronous peek for assertions.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_storage_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        assert_eq!(storage.get(CREDENTIAL_KEY).await.unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn test_file_storage_set_get_remove() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(&temp.path().join("nested"));

        storage.set(CREDENTIAL_KEY, "tok1").await.unwrap();
        storage.set(THEME_KEY, "dark").await.unwrap();
        assert_eq!(
            storage.get(CREDENTIAL_KEY).await.unwrap().as_deref(),
            Some("tok1")
        );

        storage.remove(CREDENTIAL_KEY).await.unwrap();
        assert_eq!(storage.get(CREDENTIAL_KEY).await.unwrap(), None);
        assert_eq!(storage.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));

        // Removing again is fine.
        storage.remove(CREDENTIAL_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let temp = tempdir().unwrap();
        FileStorage::new(temp.path())
            .set(CREDENTIAL_KEY, "persisted")
            .await
            .unwrap();

        let reopened = FileStorage::new(temp.path());
        assert_eq!(
            reopened.get(CREDENTIAL_KEY).await.unwrap().as_deref(),
            Some("persisted")
        );
    }

    #[tokio::test]
    async fn test_file_storage_corrupt_file() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        std::fs::write(storage.path(), "not json").unwrap();

        let result = storage.get(CREDENTIAL_KEY).await;
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_file_storage_set_replaces_corrupt_file() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        std::fs::write(storage.path(), r#"{"token": 5}"#).unwrap();

        storage.set(CREDENTIAL_KEY, "tok1").await.unwrap();
        assert_eq!(
            storage.get(CREDENTIAL_KEY).await.unwrap().as_deref(),
            Some("tok1")
        );
    }

    #[tokio::test]
    async fn test_file_storage_remove_repairs_corrupt_file() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        std::fs::write(storage.path(), "{truncated").unwrap();

        storage.remove(CREDENTIAL_KEY).await.unwrap();
        assert_eq!(storage.get(CREDENTIAL_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::with_entry(CREDENTIAL_KEY, "tok");
        assert_eq!(storage.get(CREDENTIAL_KEY).await.unwrap().as_deref(), Some("tok"));
        storage.remove(CREDENTIAL_KEY).await.unwrap();
        assert!(storage.snapshot().is_empty());
    }
}
