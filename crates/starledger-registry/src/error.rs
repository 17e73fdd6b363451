//! Error types for the registry module.

use starledger_core::Address;
use thiserror::Error;

/// Reasons a claim could not be promoted.
///
/// Callers must be able to tell these apart, so they are never folded into
/// a single "invalid" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No pending claim exists for the address.
    #[error("No pending validation request for address: '{0}'")]
    NoPendingRequest(Address),

    /// The claim's validation window has elapsed.
    #[error("Validation window expired for address: '{0}'")]
    Expired(Address),

    /// The signature does not verify against the claim's message.
    #[error("Failed to verify signature for validation request with address: '{0}'")]
    SignatureMismatch(Address),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
