//! Strong type definitions for the Star Ledger.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity a claim is registered under.
///
/// The ledger treats an address as an opaque string. Whether it can be
/// parsed as a public key is a concern of the signature verifier, not of
/// the registry or the chain.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like value.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the address, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
