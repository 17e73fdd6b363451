//! Golden test vectors for deterministic verification.
//!
//! Each vector fixes every field of a block and the digest it must hash
//! to. The `reference_block_1` vector is block 1 of the reference star
//! notary scenario; any encoder that disagrees with it cannot validate
//! chains written by that service.

use serde::Serialize;
use starledger_core::{Block, Star, StarClaim};

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub height: u64,
    pub address: &'static str,
    pub ra: &'static str,
    pub dec: &'static str,
    pub mag: Option<&'static str>,
    pub cen: Option<&'static str>,
    /// Plain-text story, hex-encoded when the block is built.
    pub story: &'static str,
    /// Unix seconds.
    pub time: u64,
    pub previous_block_hash: &'static str,
    /// Expected digest (hex).
    pub expected_hash: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "genesis",
            height: 0,
            address: "13Ps1qPQALKwXKYNPDi2enycoYEN2hZbGu",
            ra: "12h 50m 26.0s",
            dec: "25° 29' 23.9",
            mag: None,
            cen: None,
            story: "Genesis Star",
            time: 1_544_454_641,
            previous_block_hash: "",
            expected_hash: "c1eef5e73355ce1ac76585c1f27ef6db2a766d5ae414c39be9f4875ae22b7359",
        },
        GoldenVector {
            name: "reference_block_1",
            height: 1,
            address: "1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs",
            ra: "16h 29m 1.0s",
            dec: "68° 52' 56.9",
            mag: None,
            cen: None,
            story: "Found star using https://www.google.com/sky/",
            time: 1_544_454_651,
            previous_block_hash: "19d5d866bece894da5be9e3e895698782fe27e339029d7260f4e757b842bae8f",
            expected_hash: "65a6cf9e43c3d3dfa8e9785e9e637545665fea02ff71a9a8c10013a73281e4d9",
        },
        GoldenVector {
            name: "optional_fields",
            height: 2,
            address: "1EauidThcsXuEAXoWxT3DG5D9Y8KvM2CDs",
            ra: "13h 03m 33.35s",
            dec: "-49° 31' 38.1",
            mag: Some("4.8"),
            cen: Some("Centaurus"),
            story: "Found star using https://www.google.com/sky/",
            time: 1_544_454_700,
            previous_block_hash: "65a6cf9e43c3d3dfa8e9785e9e637545665fea02ff71a9a8c10013a73281e4d9",
            expected_hash: "6608ae47944f6fb725cd7062f6fb4241e4d1e4c29d74ad9274fd2367ead7874b",
        },
    ]
}

/// Build the block a vector describes, with its hash left blank.
pub fn block_from_vector(vector: &GoldenVector) -> Block<StarClaim> {
    let mut star = Star::new(vector.ra, vector.dec, vector.story);
    if let Some(mag) = vector.mag {
        star = star.with_mag(mag);
    }
    if let Some(cen) = vector.cen {
        star = star.with_cen(cen);
    }

    let mut block = Block::new(StarClaim::new(vector.address, star));
    block.height = vector.height;
    block.time = vector.time.to_string();
    block.previous_block_hash = vector.previous_block_hash.to_string();
    block
}

/// Recompute every vector's digest.
///
/// Returns `(name, matches, computed_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = block_from_vector(v).compute_hash().unwrap_or_default();
            (v.name.to_string(), hex == v.expected_hash, hex)
        })
        .collect()
}
