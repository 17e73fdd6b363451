//! The Ledger: an append-only hash chain over a key-value store.
//!
//! Blocks are persisted at their height. The ledger keeps no block cache;
//! every read goes to the store, so whatever the store holds is what gets
//! validated.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use starledger_core::{Block, Clock, Payload, StarClaim, SystemClock};
use starledger_store::KeyValueStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{LedgerError, Result};

/// Height and integrity summary of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub chain_height: u64,
    pub valid: bool,
}

/// A single-writer, hash-linked ledger.
///
/// Appends and genesis creation are serialized by an internal write lock.
/// Reads are not; they observe whatever the store has committed.
pub struct Ledger<S, P = StarClaim> {
    store: S,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
    _payload: PhantomData<fn() -> P>,
}

impl<S: KeyValueStore, P: Payload> Ledger<S, P> {
    /// Create a ledger timestamped by the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a ledger with an explicit time source.
    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
            _payload: PhantomData,
        }
    }

    /// The backing store.
    ///
    /// Writing through it bypasses the append path entirely; integrity
    /// checks will report whatever that breaks.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of blocks in the chain.
    ///
    /// On an empty store this creates the genesis block first, so the
    /// smallest height ever reported is 1.
    pub async fn height(&self) -> Result<u64> {
        let count = self.store.count().await?;
        if count > 0 {
            return Ok(count);
        }

        let _guard = self.write_lock.lock().await;
        self.height_locked().await
    }

    /// Height with genesis bootstrap. Caller holds the write lock.
    async fn height_locked(&self) -> Result<u64> {
        let count = self.store.count().await?;
        if count > 0 {
            return Ok(count);
        }

        let genesis = Block::<P>::genesis(self.clock.now())?;
        self.store.put(0, &genesis.to_bytes()?).await?;
        info!(hash = %genesis.hash, "genesis block created");
        Ok(1)
    }

    /// Append a block carrying `body` to the end of the chain.
    pub async fn add_block(&self, body: P) -> Result<Block<P>> {
        let _guard = self.write_lock.lock().await;

        let height = self.height_locked().await?;
        let previous_height = height - 1;
        let previous = self
            .read_block(previous_height)
            .await?
            .ok_or(LedgerError::NotFound(previous_height))?;

        let previous_digest = previous.compute_hash()?;
        if previous_digest != previous.hash {
            warn!(
                height = previous_height,
                recorded = %previous.hash,
                computed = %previous_digest,
                "predecessor hash does not match its content"
            );
        }

        let block = Block::new(body).link(height, previous_digest, self.clock.now())?;
        self.store.put(height, &block.to_bytes()?).await?;

        info!(height, hash = %block.hash, address = block.address(), "block appended");
        Ok(block)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// The block at `height`, if it is within the chain.
    pub async fn block_by_height(&self, height: u64) -> Result<Option<Block<P>>> {
        if height >= self.height().await? {
            return Ok(None);
        }
        self.read_block(height).await
    }

    /// The first block whose recorded hash is `hash`.
    pub async fn block_by_hash(&self, hash: &str) -> Result<Option<Block<P>>> {
        Ok(self.scan_blocks().await?.into_iter().find(|b| b.hash == hash))
    }

    /// All blocks submitted under `address`, in ascending height.
    pub async fn blocks_by_address(&self, address: &str) -> Result<Vec<Block<P>>> {
        Ok(self
            .scan_blocks()
            .await?
            .into_iter()
            .filter(|b| b.address() == address)
            .collect())
    }

    async fn read_block(&self, height: u64) -> Result<Option<Block<P>>> {
        match self.store.get(height).await? {
            Some(bytes) => Ok(Some(Block::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every decodable block, in store order.
    async fn scan_blocks(&self) -> Result<Vec<Block<P>>> {
        let entries = self.store.scan().await?;
        let mut blocks = Vec::with_capacity(entries.len());
        for (key, bytes) in entries {
            match Block::from_bytes(&bytes) {
                Ok(block) => blocks.push(block),
                Err(e) => debug!(key, error = %e, "skipping undecodable entry"),
            }
        }
        Ok(blocks)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Integrity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Check that the block at `height` hashes to its recorded hash.
    pub async fn validate_block(&self, height: u64) -> Result<(u64, bool)> {
        let block = self
            .read_block(height)
            .await?
            .ok_or(LedgerError::NotFound(height))?;
        Ok((height, block.verify_hash()?))
    }

    /// Check that the successor of `height` links to this block's content.
    pub async fn validate_block_in_chain(&self, height: u64) -> Result<(u64, bool)> {
        let block = self
            .read_block(height)
            .await?
            .ok_or(LedgerError::NotFound(height))?;
        let next_height = height + 1;
        let next = self
            .read_block(next_height)
            .await?
            .ok_or(LedgerError::NotFound(next_height))?;

        Ok((height, block.compute_hash()? == next.previous_block_hash))
    }

    /// Heights that fail their integrity check, ascending.
    ///
    /// Every block but the last is checked against its successor's link;
    /// the last is checked against its own recorded hash. A block that is
    /// missing or undecodable is reported at its own height, and its
    /// predecessor falls back to the self-check since there is no link to
    /// compare. Only store failures abort the scan.
    pub async fn validate_chain(&self) -> Result<Vec<u64>> {
        let height = self.height().await?;
        let mut corrupted = Vec::new();
        let mut successor: Option<Block<P>> = None;

        for h in (0..height).rev() {
            let current = self.readable_block(h).await?;
            let intact = match (&current, &successor) {
                (None, _) => false,
                (Some(block), Some(next)) => block.compute_hash()? == next.previous_block_hash,
                (Some(block), None) => block.verify_hash()?,
            };

            if !intact {
                if current.is_some() {
                    warn!(height = h, "block failed integrity check");
                }
                corrupted.push(h);
            }
            successor = current;
        }

        corrupted.reverse();
        Ok(corrupted)
    }

    /// The block at `height`, or `None` when it is absent or does not
    /// decode. Store failures still propagate.
    async fn readable_block(&self, height: u64) -> Result<Option<Block<P>>> {
        match self.read_block(height).await {
            Ok(Some(block)) => Ok(Some(block)),
            Ok(None) => {
                warn!(height, "block missing during integrity check");
                Ok(None)
            }
            Err(LedgerError::Store(e)) => Err(LedgerError::Store(e)),
            Err(e) => {
                warn!(height, error = %e, "block unreadable during integrity check");
                Ok(None)
            }
        }
    }

    /// Current height and whether the chain validates.
    pub async fn status(&self) -> Result<ChainStatus> {
        let chain_height = self.height().await?;
        let errors = self.validate_chain().await?;
        Ok(ChainStatus {
            chain_height,
            valid: errors.is_empty(),
        })
    }
}
