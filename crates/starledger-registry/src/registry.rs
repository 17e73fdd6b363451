//! The per-address claim state machine.
//!
//! Entries live in a single address-keyed map behind a short-held lock. The
//! lock is never held across the signature verifier call; promotion instead
//! re-checks that the very same pending entry (by generation) is still in
//! place before committing, which totally orders the transitions of each
//! address.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use starledger_core::{Address, ClearedRequest, Clock, SystemClock, ValidationRequest};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::verifier::SignatureVerifier;

/// What the registry holds for one address.
#[derive(Debug)]
enum Entry {
    Pending(PendingEntry),
    Cleared(ClearedRequest),
}

#[derive(Debug)]
struct PendingEntry {
    request: ValidationRequest,
    /// Distinguishes this claim from later claims on the same address.
    generation: u64,
    /// Reclamation timer; `None` when created outside a tokio runtime.
    expiry: Option<AbortHandle>,
}

impl PendingEntry {
    fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.abort();
        }
    }
}

struct Inner<V> {
    config: RegistryConfig,
    verifier: V,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<Address, Entry>>,
    next_generation: AtomicU64,
}

impl<V> Inner<V> {
    fn entries(&self) -> MutexGuard<'_, HashMap<Address, Entry>> {
        // Critical sections never leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn window_secs(&self) -> u64 {
        self.config.window_secs()
    }

    /// Timer callback: drop the pending entry if it is still the one the
    /// timer was armed for.
    fn expire(&self, address: &Address, generation: u64) {
        let mut entries = self.entries();
        let still_pending = matches!(
            entries.get(address),
            Some(Entry::Pending(p)) if p.generation == generation
        );
        if still_pending {
            entries.remove(address);
            debug!(%address, "validation request expired");
        }
    }
}

/// Gates record submission behind time-boxed, signature-verified claims.
///
/// Cloning is cheap and clones share state.
pub struct ValidationRegistry<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for ValidationRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: SignatureVerifier> ValidationRegistry<V> {
    /// Create a registry driven by the system clock.
    pub fn new(verifier: V, config: RegistryConfig) -> Self {
        Self::with_clock(verifier, config, Arc::new(SystemClock))
    }

    /// Create a registry with an explicit time source.
    pub fn with_clock(verifier: V, config: RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                verifier,
                clock,
                entries: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Open a claim on `address`, or report the one already open.
    ///
    /// A repeated request returns the existing claim with its remaining
    /// window recomputed; it never extends the window. A claim whose window
    /// has already elapsed is replaced by a fresh one. While the address
    /// holds an unconsumed clearance, that clearance's request is returned
    /// and no new claim is opened.
    pub fn request_validation(&self, address: &Address) -> ValidationRequest {
        let now = self.inner.clock.now();
        let window = self.inner.window_secs();
        let mut entries = self.inner.entries();

        match entries.get_mut(address) {
            Some(Entry::Pending(pending)) => {
                let remaining = pending.request.remaining_at(now, window);
                if remaining > 0 {
                    let mut request = pending.request.clone();
                    request.validation_window = remaining;
                    return request;
                }
                pending.cancel_expiry();
                debug!(%address, "replacing elapsed validation request");
            }
            Some(Entry::Cleared(cleared)) => return cleared.status.clone(),
            None => {}
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let request = ValidationRequest::new(address.clone(), now, window);
        let expiry = self.arm_expiry(address.clone(), generation);

        entries.insert(
            address.clone(),
            Entry::Pending(PendingEntry {
                request: request.clone(),
                generation,
                expiry,
            }),
        );
        info!(%address, requested_at = now, window, "validation request opened");

        request
    }

    /// Verify the wallet's signature and promote its claim to a clearance.
    ///
    /// On a mismatch the pending claim is left as is, so the wallet may
    /// retry within the remaining window.
    pub async fn verify_signature(
        &self,
        address: &Address,
        signature: &str,
    ) -> Result<ClearedRequest> {
        let window = self.inner.window_secs();

        let (request, generation) = {
            let now = self.inner.clock.now();
            let mut entries = self.inner.entries();
            let pending = match entries.get_mut(address) {
                Some(Entry::Pending(pending)) => pending,
                _ => return Err(RegistryError::NoPendingRequest(address.clone())),
            };

            if pending.request.remaining_at(now, window) <= 0 {
                pending.cancel_expiry();
                entries.remove(address);
                debug!(%address, "validation request found elapsed");
                return Err(RegistryError::Expired(address.clone()));
            }
            (pending.request.clone(), pending.generation)
        };

        let verified = self
            .inner
            .verifier
            .verify(&request.message, address, signature)
            .await;
        if !verified {
            warn!(%address, "signature verification failed");
            return Err(RegistryError::SignatureMismatch(address.clone()));
        }

        let now = self.inner.clock.now();
        let mut entries = self.inner.entries();
        match entries.remove(address) {
            Some(Entry::Pending(mut pending)) if pending.generation == generation => {
                // Cancel before the clearance becomes visible.
                pending.cancel_expiry();

                let mut request = pending.request;
                request.refresh(now, window);
                let cleared = ClearedRequest::new(request);
                entries.insert(address.clone(), Entry::Cleared(cleared.clone()));
                info!(%address, "validation request cleared");
                Ok(cleared)
            }
            Some(other) => {
                entries.insert(address.clone(), other);
                Err(RegistryError::NoPendingRequest(address.clone()))
            }
            None => Err(RegistryError::NoPendingRequest(address.clone())),
        }
    }

    /// Take the clearance for `address`, if there is one.
    ///
    /// The clearance is gone once this returns `true`, whatever the caller
    /// does next.
    pub fn consume_clearance(&self, address: &Address) -> bool {
        let mut entries = self.inner.entries();
        if matches!(entries.get(address), Some(Entry::Cleared(_))) {
            entries.remove(address);
            debug!(%address, "clearance consumed");
            true
        } else {
            false
        }
    }

    /// The open claim on `address` with its window as of now, if any.
    pub fn pending(&self, address: &Address) -> Option<ValidationRequest> {
        let now = self.inner.clock.now();
        let window = self.inner.window_secs();
        let entries = self.inner.entries();
        match entries.get(address) {
            Some(Entry::Pending(pending)) => {
                let mut request = pending.request.clone();
                request.refresh(now, window);
                (request.validation_window > 0).then_some(request)
            }
            _ => None,
        }
    }

    /// Whether `address` holds an unconsumed clearance.
    pub fn is_cleared(&self, address: &Address) -> bool {
        matches!(self.inner.entries().get(address), Some(Entry::Cleared(_)))
    }

    /// Number of addresses with a pending claim or clearance.
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Arm the reclamation timer for a new claim.
    ///
    /// Without a tokio runtime no timer is armed; lazy expiry still holds.
    fn arm_expiry(&self, address: Address, generation: u64) -> Option<AbortHandle> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let inner: Weak<Inner<V>> = Arc::downgrade(&self.inner);
        let ttl = Duration::from_secs(self.inner.window_secs());

        let task = runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire(&address, generation);
            }
        });
        Some(task.abort_handle())
    }
}
