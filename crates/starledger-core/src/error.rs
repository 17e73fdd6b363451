//! Error types for the Star Ledger Core.

use thiserror::Error;

/// Core errors that can occur while encoding or decoding ledger data.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
