//! # Star Ledger Store
//!
//! Storage abstraction for the star ledger. Provides the ordered key-value
//! interface the ledger persists blocks through, with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The ledger never caches blocks; every read goes through the
//! [`KeyValueStore`] trait. Keys are block heights, values are opaque bytes.
//!
//! ## Key Types
//!
//! - [`KeyValueStore`] - The async trait for get/put/scan
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`SqliteConfig`] - Connection tuning (busy timeout)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use starledger_store::{KeyValueStore, SqliteStore};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("chaindata.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     store.put(0, b"genesis").await.unwrap();
//!     assert_eq!(store.count().await.unwrap(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Ordered scans**: `scan` yields entries in ascending key order
//! - **Overwrites allowed**: `put` on an existing key replaces the value; the
//!   ledger's single-writer lock is what keeps heights from colliding
//! - **Bounded waits**: SQLite connections carry a busy timeout

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::{SqliteConfig, SqliteStore};
pub use traits::KeyValueStore;
