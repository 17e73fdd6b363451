//! Proptest generators for property-based testing.

use proptest::prelude::*;

use starledger_core::{Address, Block, Keypair, Star, StarClaim};

/// Generate a random wallet.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate an address backed by a real key.
pub fn address() -> impl Strategy<Value = Address> {
    keypair().prop_map(|kp| kp.address())
}

/// Generate a right ascension like `16h 29m 1.0s`.
pub fn right_ascension() -> impl Strategy<Value = String> {
    (0u32..24, 0u32..60, 0u32..600)
        .prop_map(|(h, m, s)| format!("{}h {}m {}.{}s", h, m, s / 10, s % 10))
}

/// Generate a declination like `-49° 31' 38.1`.
pub fn declination() -> impl Strategy<Value = String> {
    (-89i32..90, 0u32..60, 0u32..600)
        .prop_map(|(d, m, s)| format!("{}° {}' {}.{}", d, m, s / 10, s % 10))
}

/// Generate a story of arbitrary text.
pub fn story() -> impl Strategy<Value = String> {
    ".{0,120}"
}

/// Generate a star, sometimes with magnitude and constellation.
pub fn star() -> impl Strategy<Value = Star> {
    (
        right_ascension(),
        declination(),
        proptest::option::of("[0-9]\\.[0-9]"),
        proptest::option::of("[A-Z][a-z]{3,12}"),
        story(),
    )
        .prop_map(|(ra, dec, mag, cen, story)| {
            let mut star = Star::new(ra, dec, &story);
            star.mag = mag;
            star.cen = cen;
            star
        })
}

/// Parameters for generating a claim.
#[derive(Debug, Clone)]
pub struct ClaimParams {
    pub wallet: Keypair,
    pub star: Star,
}

impl Arbitrary for ClaimParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (keypair(), star())
            .prop_map(|(wallet, star)| ClaimParams { wallet, star })
            .boxed()
    }
}

/// Generate a claim from parameters.
pub fn claim_from_params(params: &ClaimParams) -> StarClaim {
    StarClaim::new(params.wallet.address(), params.star.clone())
}

/// A sealed, linked block for `params`.
pub fn block_from_params(
    params: &ClaimParams,
    height: u64,
    previous_digest: &str,
    time: u64,
) -> Block<StarClaim> {
    let mut block = Block::new(claim_from_params(params));
    block.height = height;
    block.previous_block_hash = previous_digest.to_string();
    block.time = time.to_string();
    block.seal().expect("star claims always encode");
    block
}
