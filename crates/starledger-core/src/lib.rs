//! # Star Ledger Core
//!
//! Pure primitives for the star ledger: blocks, canonical hashing, star
//! claims, and the validation request types shared by the registry.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over the ledger's data structures.
//!
//! ## Key Types
//!
//! - [`Block`] - One immutable record in the hash chain
//! - [`Payload`] - The body carried by a block (see [`StarClaim`])
//! - [`Address`] - The identity a claim is made under
//! - [`ValidationRequest`] / [`ClearedRequest`] - Pending and cleared claims
//! - [`Clock`] - Source of unix-second timestamps
//!
//! ## Canonicalization
//!
//! Block digests are SHA-256 over a fixed-field-order JSON encoding with the
//! `hash` field blanked. See [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod request;
pub mod star;
pub mod types;

pub use block::{Block, Payload};
pub use canonical::{block_digest, canonical_bytes};
pub use clock::{Clock, ManualClock, SystemClock, UnixSeconds};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Hash};
pub use error::{CoreError, Result};
pub use request::{ClearedRequest, ValidationRequest, MESSAGE_SUFFIX};
pub use star::{DecodedStar, Star, StarBlockView, StarClaim, StarClaimView};
pub use types::Address;
