//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use starledger::{LedgerError, Notary, NotaryConfig, NotaryError};
use starledger_core::{Address, Block, ClearedRequest, Keypair, ManualClock, Star, StarClaim};
use starledger_registry::Ed25519Verifier;
use starledger_store::{KeyValueStore, MemoryStore};

/// Request time of the reference star notary scenario.
pub const REFERENCE_TIME: u64 = 1_544_454_641;

/// A wallet and a manual clock.
///
/// Every notary built from the fixture shares its clock, so advancing it
/// moves both the registry windows and the block timestamps.
pub struct TestFixture {
    pub wallet: Keypair,
    pub clock: Arc<ManualClock>,
}

impl TestFixture {
    /// Create a new test fixture with a random wallet.
    pub fn new() -> Self {
        Self {
            wallet: Keypair::generate(),
            clock: Arc::new(ManualClock::new(REFERENCE_TIME)),
        }
    }

    /// Create with a deterministic wallet from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            wallet: Keypair::from_seed(&seed),
            clock: Arc::new(ManualClock::new(REFERENCE_TIME)),
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// A notary over a fresh in-memory store.
    pub fn notary(&self) -> Notary<MemoryStore, Ed25519Verifier> {
        self.notary_with(MemoryStore::new(), NotaryConfig::default())
    }

    /// A notary over `store` with `config`.
    pub fn notary_with<S: KeyValueStore>(
        &self,
        store: S,
        config: NotaryConfig,
    ) -> Notary<S, Ed25519Verifier> {
        Notary::with_clock(store, Ed25519Verifier, config, self.clock.clone())
    }

    /// Request validation and sign the returned message.
    pub fn request_and_sign<S: KeyValueStore>(&self, notary: &Notary<S, Ed25519Verifier>) -> String {
        let request = notary.request_validation(&self.address());
        self.wallet.sign_message(&request.message)
    }

    /// Run the claim flow up to a clearance.
    pub async fn clear<S: KeyValueStore>(
        &self,
        notary: &Notary<S, Ed25519Verifier>,
    ) -> Result<ClearedRequest, NotaryError> {
        let signature = self.request_and_sign(notary);
        notary.verify_signature(&self.address(), &signature).await
    }

    /// Run the full claim flow and register `star`.
    pub async fn register<S: KeyValueStore>(
        &self,
        notary: &Notary<S, Ed25519Verifier>,
        star: Star,
    ) -> Result<Block<StarClaim>, NotaryError> {
        self.clear(notary).await?;
        notary.append_record(&self.address(), star).await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic wallets for multi-party tests.
pub fn wallets(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0x5a;
            Keypair::from_seed(&seed)
        })
        .collect()
}

/// A star with fixed coordinates and the given story.
pub fn sample_star(story: &str) -> Star {
    Star::new("16h 29m 1.0s", "68° 52' 56.9", story)
}

/// Rewrite the story of the block at `height` directly in the store.
///
/// The recorded hash is left alone, so the block no longer matches it.
pub async fn tamper_story<S: KeyValueStore>(
    store: &S,
    height: u64,
    story: &str,
) -> Result<(), LedgerError> {
    let bytes = store.get(height).await?.ok_or(LedgerError::NotFound(height))?;
    let mut block = Block::<StarClaim>::from_bytes(&bytes)?;
    block.body.star.story = hex::encode(story);
    store.put(height, &block.to_bytes()?).await?;
    Ok(())
}
