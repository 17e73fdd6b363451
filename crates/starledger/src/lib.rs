//! # Star Ledger
//!
//! A proof-of-existence log for star claims: an append-only hash chain
//! whose writes are gated by time-boxed, signature-verified claims on an
//! address.
//!
//! ## Overview
//!
//! - **Ledger**: Single-writer chain of blocks, each linked to its
//!   predecessor by a SHA-256 digest
//! - **Registry**: Per-address state machine that turns a signed claim into
//!   a one-shot clearance
//! - **Notary**: The facade a gateway talks to; spends the clearance in
//!   front of every append
//!
//! This is not a distributed blockchain. There is no peer network, no
//! consensus and no mining.
//!
//! ## Key Concepts
//!
//! - **Genesis**: Created lazily the first time the height of an empty store
//!   is asked for. The smallest height ever reported is 1.
//! - **Integrity**: Corruption is data. `validate_chain` lists corrupted
//!   heights instead of failing.
//! - **Clearance**: Consumed before the append runs, and not restored if the
//!   append fails.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use starledger::{Notary, NotaryConfig};
//! use starledger::core::{Keypair, Star};
//! use starledger::registry::Ed25519Verifier;
//! use starledger::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("chaindata.db").unwrap();
//!     let notary = Notary::new(store, Ed25519Verifier, NotaryConfig::from_env());
//!
//!     let wallet = Keypair::generate();
//!     let address = wallet.address();
//!
//!     // Claim the address and prove control of it
//!     let request = notary.request_validation(&address);
//!     let signature = wallet.sign_message(&request.message);
//!     notary.verify_signature(&address, &signature).await.unwrap();
//!
//!     // Spend the clearance on one star
//!     let star = Star::new("16h 29m 1.0s", "68° 52' 56.9", "Found star using https://www.google.com/sky/");
//!     let block = notary.append_record(&address, star).await.unwrap();
//!     assert_eq!(block.height, 1);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `starledger::core` - Blocks, hashing, star claims, request types
//! - `starledger::store` - Key-value store abstraction and SQLite
//! - `starledger::registry` - The validation registry and verifiers

pub mod config;
pub mod error;
pub mod ledger;
pub mod notary;

// Re-export component crates
pub use starledger_core as core;
pub use starledger_registry as registry;
pub use starledger_store as store;

// Re-export main types for convenience
pub use config::NotaryConfig;
pub use error::{LedgerError, NotaryError, Result};
pub use ledger::{ChainStatus, Ledger};
pub use notary::{BlockQuery, Notary};

// Re-export commonly used core types
pub use starledger_core::{
    Address, Block, ClearedRequest, Keypair, Star, StarBlockView, StarClaim, ValidationRequest,
};
