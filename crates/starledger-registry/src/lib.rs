//! # Star Ledger Registry
//!
//! The validation registry (the "mempool") that gates ledger writes behind
//! a time-boxed, signature-verified claim on an address.
//!
//! ## Overview
//!
//! Each address moves through a small state machine:
//!
//! ```text
//! None ──request──→ Pending ──verify──→ Cleared ──consume──→ None
//!                      │
//!                      └── window elapsed ──→ None
//! ```
//!
//! A wallet requests validation, signs the returned message with the key
//! behind its address, and submits the signature. A verified claim becomes
//! a one-shot clearance that the record-append path consumes.
//!
//! ## Key Concepts
//!
//! - **Lazy expiry**: every access recomputes the remaining window, so an
//!   elapsed claim is never honoured even if its timer has not fired yet
//! - **Expiry timer**: a cancelable task that reclaims abandoned entries
//! - **Fixed message**: `"{address}:{requestTimeStamp}:starRegistry"`, built
//!   once when the claim is created
//! - **Verifiers**: [`Ed25519Verifier`] for hex keys and signatures,
//!   [`BitcoinMessageVerifier`] for P2PKH addresses and base64 compact
//!   signatures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use starledger_core::{Address, Keypair};
//! use starledger_registry::{Ed25519Verifier, RegistryConfig, ValidationRegistry};
//!
//! async fn example() {
//!     let registry = ValidationRegistry::new(Ed25519Verifier, RegistryConfig::default());
//!
//!     let wallet = Keypair::generate();
//!     let address = wallet.address();
//!
//!     let request = registry.request_validation(&address);
//!     let signature = wallet.sign_message(&request.message);
//!
//!     let cleared = registry.verify_signature(&address, &signature).await.unwrap();
//!     assert!(cleared.register_star);
//!     assert!(registry.consume_clearance(&address));
//! }
//! ```

pub mod bitcoin;
pub mod config;
pub mod error;
pub mod registry;
pub mod verifier;

pub use bitcoin::BitcoinMessageVerifier;
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::ValidationRegistry;
pub use verifier::{Ed25519Verifier, SignatureVerifier};
