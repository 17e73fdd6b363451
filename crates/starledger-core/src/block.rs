//! Block: one immutable record in the hash chain.
//!
//! A block is sealed exactly once, at append time, by computing its digest
//! over the canonical encoding with the `hash` field blanked. After that it
//! is never modified.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::canonical::block_digest;
use crate::error::{CoreError, Result};

/// The body a block carries.
///
/// The ledger treats the body as opaque apart from the two things it needs:
/// the address the record was submitted under, and a deterministic
/// placeholder for the genesis block.
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The address this record belongs to.
    fn address(&self) -> &str;

    /// The placeholder body of the genesis block.
    fn genesis() -> Self;
}

/// A block in the ledger.
///
/// Field declaration order is the serialization order and therefore part
/// of the hashing contract: `hash`, `height`, `body`, `time`,
/// `previousBlockHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<P> {
    /// Hex SHA-256 of the canonical encoding with this field blanked.
    pub hash: String,
    /// Position in the chain, 0 for genesis.
    pub height: u64,
    /// The record payload.
    pub body: P,
    /// Unix seconds as a decimal string.
    pub time: String,
    /// Digest of the predecessor, empty for genesis.
    pub previous_block_hash: String,
}

impl<P: Payload> Block<P> {
    /// Create an unsealed block carrying `body`.
    pub fn new(body: P) -> Self {
        Self {
            hash: String::new(),
            height: 0,
            body,
            time: String::new(),
            previous_block_hash: String::new(),
        }
    }

    /// Build and seal the genesis block.
    pub fn genesis(time: u64) -> Result<Self> {
        let mut block = Self::new(P::genesis());
        block.time = time.to_string();
        block.seal()?;
        Ok(block)
    }

    /// Link this block after `previous` and seal it.
    ///
    /// `previous_digest` is the digest recomputed from the predecessor's
    /// content, not the hash it has on record.
    pub fn link(mut self, height: u64, previous_digest: String, time: u64) -> Result<Self> {
        self.height = height;
        self.previous_block_hash = previous_digest;
        self.time = time.to_string();
        self.seal()?;
        Ok(self)
    }

    /// Recompute the digest over the block with its hash blanked.
    pub fn compute_hash(&self) -> Result<String> {
        Ok(block_digest(self)?.to_hex())
    }

    /// Set `hash` to the computed digest.
    pub fn seal(&mut self) -> Result<()> {
        self.hash = self.compute_hash()?;
        Ok(())
    }

    /// Whether the recorded hash matches the content.
    pub fn verify_hash(&self) -> Result<bool> {
        Ok(self.compute_hash()? == self.hash)
    }

    /// The address the body was submitted under.
    pub fn address(&self) -> &str {
        self.body.address()
    }

    /// Whether this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Encode for storage (hash included).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CoreError::Encoding(e.to_string()))
    }

    /// Decode a stored block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| CoreError::Decoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::star::{Star, StarClaim};

    fn claim(address: &str) -> StarClaim {
        StarClaim::new(
            address,
            Star::new("16h 29m 1.0s", "68° 52' 56.9", "Found star"),
        )
    }

    #[test]
    fn test_genesis_is_sealed() {
        let genesis = Block::<StarClaim>::genesis(1_544_454_641).unwrap();
        assert_eq!(genesis.height, 0);
        assert!(genesis.previous_block_hash.is_empty());
        assert_eq!(genesis.time, "1544454641");
        assert_eq!(genesis.hash.len(), 64);
        assert!(genesis.verify_hash().unwrap());
    }

    #[test]
    fn test_genesis_deterministic_for_fixed_time() {
        let a = Block::<StarClaim>::genesis(100).unwrap();
        let b = Block::<StarClaim>::genesis(100).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_link_sets_predecessor() {
        let genesis = Block::<StarClaim>::genesis(100).unwrap();
        let prev = genesis.compute_hash().unwrap();

        let block = Block::new(claim("addr")).link(1, prev.clone(), 110).unwrap();
        assert_eq!(block.height, 1);
        assert_eq!(block.previous_block_hash, prev);
        assert_eq!(block.previous_block_hash, genesis.hash);
        assert!(block.verify_hash().unwrap());
    }

    #[test]
    fn test_tampered_body_fails_verification() {
        let mut block = Block::new(claim("addr")).link(1, "00".into(), 110).unwrap();
        block.body.star.story = hex::encode("Edited story");
        assert!(!block.verify_hash().unwrap());
    }

    #[test]
    fn test_storage_roundtrip_preserves_hash() {
        let block = Block::new(claim("addr")).link(3, "ab".into(), 120).unwrap();
        let bytes = block.to_bytes().unwrap();
        let decoded = Block::<StarClaim>::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, block);
        assert_eq!(decoded.compute_hash().unwrap(), block.hash);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = Block::<StarClaim>::from_bytes(b"not json").unwrap_err();
        assert!(matches!(err, CoreError::Decoding(_)));
    }

    #[test]
    fn test_serialized_field_order() {
        let block = Block::new(claim("addr")).link(1, "prev".into(), 7).unwrap();
        let json = String::from_utf8(block.to_bytes().unwrap()).unwrap();

        let hash_at = json.find("\"hash\"").unwrap();
        let height_at = json.find("\"height\"").unwrap();
        let body_at = json.find("\"body\"").unwrap();
        let time_at = json.find("\"time\"").unwrap();
        let prev_at = json.find("\"previousBlockHash\"").unwrap();
        assert!(hash_at < height_at && height_at < body_at);
        assert!(body_at < time_at && time_at < prev_at);
    }
}
