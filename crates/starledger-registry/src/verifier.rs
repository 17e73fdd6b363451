//! Signature verification capability.

use std::sync::Arc;

use async_trait::async_trait;
use starledger_core::{Address, Ed25519PublicKey, Ed25519Signature};

/// Checks that `signature` over `message` was produced by the key behind
/// `address`.
///
/// Implementations never fail: input that cannot be verified (malformed
/// address, malformed signature, wrong key) yields `false`.
#[async_trait]
pub trait SignatureVerifier: Send + Sync + 'static {
    async fn verify(&self, message: &str, address: &Address, signature: &str) -> bool;
}

#[async_trait]
impl<V: SignatureVerifier + ?Sized> SignatureVerifier for Arc<V> {
    async fn verify(&self, message: &str, address: &Address, signature: &str) -> bool {
        (**self).verify(message, address, signature).await
    }
}

/// Ed25519 verifier.
///
/// The address is the hex-encoded 32-byte public key; the signature is the
/// hex-encoded 64-byte signature over the UTF-8 message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

#[async_trait]
impl SignatureVerifier for Ed25519Verifier {
    async fn verify(&self, message: &str, address: &Address, signature: &str) -> bool {
        let Ok(public_key) = Ed25519PublicKey::from_address(address) else {
            return false;
        };
        let Ok(signature) = Ed25519Signature::from_hex(signature) else {
            return false;
        };
        public_key.verify(message.as_bytes(), &signature).is_ok()
    }
}
