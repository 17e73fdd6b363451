//! # Star Ledger Testkit
//!
//! Testing utilities for the star ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Blocks with known digests, including block 1 of the
//!   reference star notary scenario
//! - **Generators**: Proptest strategies for stars, claims and wallets
//! - **Fixtures**: A wallet and a manual clock wired to a notary
//!
//! ## Golden Vectors
//!
//! ```rust
//! use starledger_testkit::vectors::{all_vectors, block_from_vector};
//!
//! for vector in all_vectors() {
//!     let block = block_from_vector(&vector);
//!     assert_eq!(block.compute_hash().unwrap(), vector.expected_hash);
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use starledger_testkit::fixtures::{sample_star, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let notary = fixture.notary();
//!
//!     let block = fixture.register(&notary, sample_star("my star")).await.unwrap();
//!     assert_eq!(block.height, 1);
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_star, tamper_story, wallets, TestFixture, REFERENCE_TIME};
pub use generators::{claim_from_params, ClaimParams};
pub use vectors::{all_vectors, block_from_vector, verify_all_vectors, GoldenVector};
