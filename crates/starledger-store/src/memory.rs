//! In-memory implementation of the KeyValueStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::KeyValueStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    entries: RwLock<BTreeMap<u64, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u64, Vec<u8>>>> {
        self.entries
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u64, Vec<u8>>>> {
        self.entries
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(&key).cloned())
    }

    async fn put(&self, key: u64, value: &[u8]) -> Result<()> {
        self.write()?.insert(key, value.to_vec());
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<(u64, Vec<u8>)>> {
        Ok(self
            .read()?
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.get(0).await.unwrap(), None);

        store.put(0, b"genesis").await.unwrap();
        assert_eq!(store.get(0).await.unwrap(), Some(b"genesis".to_vec()));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_scan_ordered() {
        let store = MemoryStore::new();
        for key in [10u64, 2, 1, 0] {
            store.put(key, key.to_string().as_bytes()).await.unwrap();
        }

        let keys: Vec<u64> = store.scan().await.unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 1, 2, 10]);
    }

    #[tokio::test]
    async fn test_memory_store_overwrite() {
        let store = MemoryStore::new();
        store.put(1, b"a").await.unwrap();
        store.put(1, b"b").await.unwrap();

        assert_eq!(store.get(1).await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
