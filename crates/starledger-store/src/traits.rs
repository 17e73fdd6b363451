//! KeyValueStore trait: the abstract interface for block persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Ordered key-value storage over opaque values.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored at `key`.
    async fn get(&self, key: u64) -> Result<Option<Vec<u8>>>;

    /// Store `value` at `key`, replacing any previous value.
    async fn put(&self, key: u64, value: &[u8]) -> Result<()>;

    /// All entries in ascending key order.
    async fn scan(&self) -> Result<Vec<(u64, Vec<u8>)>>;

    /// Number of stored entries.
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: u64) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn put(&self, key: u64, value: &[u8]) -> Result<()> {
        (**self).put(key, value).await
    }

    async fn scan(&self) -> Result<Vec<(u64, Vec<u8>)>> {
        (**self).scan().await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }
}
