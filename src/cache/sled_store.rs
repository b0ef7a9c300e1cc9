//! Sled-backed durable storage for cached fragments.

use super::storage::CacheStorage;
use crate::error::StorageError;
use std::path::Path;

pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    /// Open (or create) the sled database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Backend(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl CacheStorage for SledStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(value) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| StorageError::Backend(format!("Non UTF-8 value for {}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes())?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }
}
