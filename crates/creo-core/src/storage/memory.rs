//! In-memory storage backend.
//!
//! Used by tests and by hosts that do not want durable persistence.
//! Clones share the same underlying map, mirroring how a file-backed
//! backend would be shared across stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use creo_types::error::StorageError;

use super::StorageBackend;

/// A `StorageBackend` holding payloads in a shared in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().expect("memory storage poisoned")
    }
}

impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set("k", "[1,2]").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert!(storage.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set("k", "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
