//! Error types for the ledger and the notary facade.

use starledger_core::{Address, CoreError};
use starledger_registry::RegistryError;
use starledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
///
/// Chain corruption is not among them: integrity checks report corrupted
/// heights as data.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No block is stored at this height.
    #[error("block not found at height {0}")]
    NotFound(u64),

    /// The store failed; the in-flight operation is abandoned, not retried.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A block could not be encoded or decoded.
    #[error("block encoding error: {0}")]
    Core(#[from] CoreError),
}

/// Errors surfaced by the [`Notary`](crate::Notary).
#[derive(Debug, Error)]
pub enum NotaryError {
    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Claim could not be promoted.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Lookup miss.
    #[error("{0}")]
    NotFound(String),

    /// Append attempted without a clearance for the address.
    #[error("Unable to add star: no valid request for '{0}' found")]
    Unauthorized(Address),

    /// A lookup query could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
