//! Canonical block encoding for deterministic hashing.
//!
//! The digest of a block is SHA-256 over its JSON encoding with:
//! - Fields in declaration order (`hash`, `height`, `body`, `time`, `previousBlockHash`)
//! - The `hash` field present and set to `""`, never omitted
//! - No insignificant whitespace
//!
//! Body field order comes from the payload's own struct declaration, so a
//! payload must never be a generic map whose iteration order can drift.
//! The write path and every verification path go through [`block_digest`].

use serde::Serialize;

use crate::block::Block;
use crate::crypto::Sha256Hash;
use crate::error::{CoreError, Result};

/// Borrowed view of a block with the hash blanked.
///
/// Must mirror the field order of [`Block`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blanked<'a, P> {
    hash: &'static str,
    height: u64,
    body: &'a P,
    time: &'a str,
    previous_block_hash: &'a str,
}

/// Encode a block to the bytes its digest is computed over.
pub fn canonical_bytes<P: Serialize>(block: &Block<P>) -> Result<Vec<u8>> {
    let blanked = Blanked {
        hash: "",
        height: block.height,
        body: &block.body,
        time: &block.time,
        previous_block_hash: &block.previous_block_hash,
    };
    serde_json::to_vec(&blanked).map_err(|e| CoreError::Encoding(e.to_string()))
}

/// Compute the digest of a block.
pub fn block_digest<P: Serialize>(block: &Block<P>) -> Result<Sha256Hash> {
    Ok(Sha256Hash::hash(&canonical_bytes(block)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::star::{Star, StarClaim};
    use proptest::prelude::*;

    fn sample_block() -> Block<StarClaim> {
        Block {
            hash: "65a6cf9e".into(),
            height: 1,
            body: StarClaim::new(
                "1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs",
                Star::new(
                    "16h 29m 1.0s",
                    "68° 52' 56.9",
                    "Found star using https://www.google.com/sky/",
                ),
            ),
            time: "1544454651".into(),
            previous_block_hash:
                "19d5d866bece894da5be9e3e895698782fe27e339029d7260f4e757b842bae8f".into(),
        }
    }

    #[test]
    fn test_canonical_bytes_exact_layout() {
        let bytes = canonical_bytes(&sample_block()).unwrap();
        let expected = concat!(
            r#"{"hash":"","height":1,"body":{"address":"1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs","#,
            r#""star":{"ra":"16h 29m 1.0s","dec":"68° 52' 56.9","#,
            r#""story":"466f756e642073746172207573696e672068747470733a2f2f7777772e676f6f676c652e636f6d2f736b792f"}},"#,
            r#""time":"1544454651","#,
            r#""previousBlockHash":"19d5d866bece894da5be9e3e895698782fe27e339029d7260f4e757b842bae8f"}"#,
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_digest_matches_reference_notary() {
        // Block 1 of the reference star notary scenario.
        let digest = block_digest(&sample_block()).unwrap();
        assert_eq!(
            digest.to_hex(),
            "65a6cf9e43c3d3dfa8e9785e9e637545665fea02ff71a9a8c10013a73281e4d9"
        );
    }

    #[test]
    fn test_blanked_view_matches_block_encoding() {
        let mut block = sample_block();
        let canonical = canonical_bytes(&block).unwrap();

        block.hash.clear();
        assert_eq!(serde_json::to_vec(&block).unwrap(), canonical);
    }

    #[test]
    fn test_digest_ignores_recorded_hash() {
        let mut a = sample_block();
        let mut b = sample_block();
        a.hash = "x".into();
        b.hash = "y".into();
        assert_eq!(block_digest(&a).unwrap(), block_digest(&b).unwrap());
    }

    proptest! {
        #[test]
        fn test_digest_deterministic(story in ".{0,64}", height in 0u64..1_000_000, time in 0u64..4_000_000_000) {
            let mut block = sample_block();
            block.height = height;
            block.time = time.to_string();
            block.body.star = Star::new("1h", "2°", &story);

            let d1 = block_digest(&block).unwrap();
            let decoded = Block::<StarClaim>::from_bytes(&block.to_bytes().unwrap()).unwrap();
            let d2 = block_digest(&decoded).unwrap();
            prop_assert_eq!(d1, d2);
        }
    }
}
