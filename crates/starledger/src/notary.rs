//! The Notary: the gateway-facing facade over the ledger and the registry.
//!
//! A transport layer (HTTP or otherwise) talks to this type only. It wires
//! the one-shot clearance check in front of every append and turns lookup
//! misses into displayable errors.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use starledger_core::{
    Address, Block, ClearedRequest, Clock, Star, StarClaim, SystemClock, ValidationRequest,
};
use starledger_registry::{SignatureVerifier, ValidationRegistry};
use starledger_store::{KeyValueStore, SqliteStore};
use tracing::{info, warn};

use crate::config::NotaryConfig;
use crate::error::{LedgerError, NotaryError};
use crate::ledger::{ChainStatus, Ledger};

type Result<T> = std::result::Result<T, NotaryError>;

/// A block lookup as a gateway would phrase it.
///
/// Parses from `"hash:<hex>"`, `"address:<address>"`, or a bare height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockQuery {
    Height(u64),
    Hash(String),
    Address(Address),
}

impl FromStr for BlockQuery {
    type Err = NotaryError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(hash) = s.strip_prefix("hash:") {
            return Ok(Self::Hash(hash.to_string()));
        }
        if let Some(address) = s.strip_prefix("address:") {
            return Ok(Self::Address(Address::from(address)));
        }
        s.parse::<u64>()
            .map(Self::Height)
            .map_err(|_| NotaryError::InvalidQuery(s.to_string()))
    }
}

impl fmt::Display for BlockQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height(h) => write!(f, "{}", h),
            Self::Hash(hash) => write!(f, "hash:{}", hash),
            Self::Address(address) => write!(f, "address:{}", address),
        }
    }
}

/// Ledger plus validation registry, sharing one clock.
pub struct Notary<S, V> {
    ledger: Ledger<S, StarClaim>,
    registry: ValidationRegistry<V>,
    config: NotaryConfig,
}

impl<V: SignatureVerifier> Notary<SqliteStore, V> {
    /// Open (or create) a SQLite-backed notary at `path`.
    pub fn open_sqlite(path: impl AsRef<Path>, verifier: V, config: NotaryConfig) -> Result<Self> {
        let store =
            SqliteStore::open_with(path, config.sqlite.clone()).map_err(LedgerError::from)?;
        Ok(Self::new(store, verifier, config))
    }
}

impl<S: KeyValueStore, V: SignatureVerifier> Notary<S, V> {
    /// Create a notary driven by the system clock.
    pub fn new(store: S, verifier: V, config: NotaryConfig) -> Self {
        Self::with_clock(store, verifier, config, Arc::new(SystemClock))
    }

    /// Create a notary with an explicit time source.
    pub fn with_clock(store: S, verifier: V, config: NotaryConfig, clock: Arc<dyn Clock>) -> Self {
        let ledger = Ledger::with_clock(store, Arc::clone(&clock));
        let registry = ValidationRegistry::with_clock(verifier, config.registry.clone(), clock);
        Self {
            ledger,
            registry,
            config,
        }
    }

    pub fn ledger(&self) -> &Ledger<S, StarClaim> {
        &self.ledger
    }

    pub fn registry(&self) -> &ValidationRegistry<V> {
        &self.registry
    }

    pub fn config(&self) -> &NotaryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chain Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of blocks, genesis included.
    pub async fn height(&self) -> Result<u64> {
        Ok(self.ledger.height().await?)
    }

    /// Heights that fail their integrity check.
    pub async fn validate_chain_errors(&self) -> Result<Vec<u64>> {
        Ok(self.ledger.validate_chain().await?)
    }

    pub async fn status(&self) -> Result<ChainStatus> {
        Ok(self.ledger.status().await?)
    }

    pub async fn block_by_height(&self, height: u64) -> Result<Block<StarClaim>> {
        self.ledger
            .block_by_height(height)
            .await?
            .ok_or_else(|| NotaryError::NotFound(format!("No stars with height {} found", height)))
    }

    pub async fn block_by_hash(&self, hash: &str) -> Result<Block<StarClaim>> {
        self.ledger
            .block_by_hash(hash)
            .await?
            .ok_or_else(|| NotaryError::NotFound(format!("No stars with hash:{} found", hash)))
    }

    /// Every block submitted under `address`; an empty result is a miss.
    pub async fn blocks_by_address(&self, address: &Address) -> Result<Vec<Block<StarClaim>>> {
        let blocks = self.ledger.blocks_by_address(address.as_str()).await?;
        if blocks.is_empty() {
            return Err(NotaryError::NotFound(format!(
                "No stars with address:{} found",
                address
            )));
        }
        Ok(blocks)
    }

    /// Resolve a parsed lookup.
    pub async fn find(&self, query: &BlockQuery) -> Result<Vec<Block<StarClaim>>> {
        match query {
            BlockQuery::Height(h) => Ok(vec![self.block_by_height(*h).await?]),
            BlockQuery::Hash(hash) => Ok(vec![self.block_by_hash(hash).await?]),
            BlockQuery::Address(address) => self.blocks_by_address(address).await,
        }
    }

    /// Append a star under `address`, spending its clearance.
    ///
    /// The clearance is consumed before the append is attempted and is not
    /// restored if the append fails; the wallet must start a new claim.
    pub async fn append_record(&self, address: &Address, star: Star) -> Result<Block<StarClaim>> {
        if !self.registry.consume_clearance(address) {
            return Err(NotaryError::Unauthorized(address.clone()));
        }

        match self.ledger.add_block(StarClaim::new(address, star)).await {
            Ok(block) => {
                info!(%address, height = block.height, "star registered");
                Ok(block)
            }
            Err(e) => {
                warn!(%address, error = %e, "append failed after clearance was consumed");
                Err(e.into())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Claim Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn request_validation(&self, address: &Address) -> ValidationRequest {
        self.registry.request_validation(address)
    }

    pub async fn verify_signature(
        &self,
        address: &Address,
        signature: &str,
    ) -> Result<ClearedRequest> {
        Ok(self.registry.verify_signature(address, signature).await?)
    }

    pub fn consume_clearance(&self, address: &Address) -> bool {
        self.registry.consume_clearance(address)
    }
}
