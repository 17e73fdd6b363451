//! SQLite implementation of the KeyValueStore trait.
//!
//! This is the primary storage backend for the star ledger. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::KeyValueStore;

/// Connection tuning for [`SqliteStore`].
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path with default settings.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, SqliteConfig::default())
    }

    /// Open a SQLite database at the given path.
    pub fn open_with(path: impl AsRef<Path>, config: SqliteConfig) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, &config)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, &SqliteConfig::default())
    }

    fn from_connection(mut conn: Connection, config: &SqliteConfig) -> Result<Self> {
        conn.busy_timeout(config.busy_timeout)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

fn to_sql_key(key: u64) -> Result<i64> {
    i64::try_from(key).map_err(|_| StoreError::Unavailable(format!("key {} out of range", key)))
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: u64) -> Result<Option<Vec<u8>>> {
        let key = to_sql_key(key)?;
        self.run(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM entries WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn put(&self, key: u64, value: &[u8]) -> Result<()> {
        let key = to_sql_key(key)?;
        let value = value.to_vec();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO entries (key, value, written_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                written_at = excluded.written_at",
                params![key, value, now_millis()],
            )?;
            Ok(())
        })
        .await
    }

    async fn scan(&self) -> Result<Vec<(u64, Vec<u8>)>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM entries ORDER BY key ASC")?;
            let rows = stmt.query_map([], |row| {
                let key: i64 = row.get(0)?;
                let value: Vec<u8> = row.get(1)?;
                Ok((key as u64, value))
            })?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteStore::open_memory().unwrap();

        store.put(0, b"genesis").await.unwrap();
        assert_eq!(store.get(0).await.unwrap(), Some(b"genesis".to_vec()));
        assert_eq!(store.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::open_memory().unwrap();

        store.put(3, b"first").await.unwrap();
        store.put(3, b"second").await.unwrap();

        assert_eq!(store.get(3).await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scan_is_numerically_ordered() {
        let store = SqliteStore::open_memory().unwrap();
        for key in [10u64, 9, 2, 1, 0] {
            store.put(key, &[key as u8]).await.unwrap();
        }

        let entries = store.scan().await.unwrap();
        let keys: Vec<u64> = entries.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![0, 1, 2, 9, 10]);
        assert_eq!(entries[4].1, vec![10u8]);
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chaindata.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(0, b"genesis").await.unwrap();
            store.put(1, b"star").await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get(1).await.unwrap(), Some(b"star".to_vec()));
    }

    fn writes() -> impl Strategy<Value = Vec<(u64, Vec<u8>)>> {
        prop::collection::vec((0u64..64, prop::collection::vec(any::<u8>(), 0..32)), 0..40)
    }

    proptest! {
        #[test]
        fn test_matches_memory_store(writes in writes()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let (sqlite, memory) = runtime.block_on(async {
                let sqlite = SqliteStore::open_memory().unwrap();
                let memory = MemoryStore::new();
                for (key, value) in &writes {
                    sqlite.put(*key, value).await.unwrap();
                    memory.put(*key, value).await.unwrap();
                }
                assert_eq!(sqlite.count().await.unwrap(), memory.count().await.unwrap());
                (sqlite.scan().await.unwrap(), memory.scan().await.unwrap())
            });

            prop_assert_eq!(sqlite, memory);
        }
    }

    #[tokio::test]
    async fn test_key_out_of_range() {
        let store = SqliteStore::open_memory().unwrap();
        let err = store.put(u64::MAX, b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
