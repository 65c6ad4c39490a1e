use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};
use vault_chain::Network;

use super::collaborators::ProtocolService;
use super::correlation::CorrelationId;
use super::error::PendingError;
use super::types::{BeaconRequest, WalletRef};

/// Wallet, protocol and network resolved once for a single request.
#[derive(Clone)]
pub struct ResolvedContext {
    pub wallet: Option<WalletRef>,
    pub protocol: Arc<dyn ProtocolService>,
    pub network: Option<Network>,
}

impl fmt::Debug for ResolvedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedContext")
            .field("wallet", &self.wallet)
            .field("protocol", &self.protocol.identifier())
            .field("network", &self.network)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request: BeaconRequest,
    pub context: ResolvedContext,
    /// Insertion order across the lifetime of the store.
    pub sequence: u64,
    pub created_at: Instant,
}

/// Requests awaiting an external completion step, keyed by correlation id.
///
/// Process-local; entries are lost on restart. Without a TTL an abandoned
/// entry stays until it is taken.
#[derive(Debug, Default)]
pub struct PendingRequests {
    inner: Mutex<PendingInner>,
    ttl: Option<Duration>,
}

#[derive(Debug, Default)]
struct PendingInner {
    entries: HashMap<CorrelationId, PendingRequest>,
    next_sequence: u64,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            inner: Mutex::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn put(
        &self,
        id: CorrelationId,
        request: BeaconRequest,
        context: ResolvedContext,
    ) -> Result<u64, PendingError> {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&id) {
            return Err(PendingError::Duplicate(id));
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        debug!(
            "pending put: id={id}, request_id={}, sequence={sequence}",
            request.id()
        );
        inner.entries.insert(
            id,
            PendingRequest {
                request,
                context,
                sequence,
                created_at: Instant::now(),
            },
        );
        Ok(sequence)
    }

    /// Removes and returns the entry for `id`.
    pub fn take(&self, id: &CorrelationId) -> Option<PendingRequest> {
        let taken = self.inner.lock().entries.remove(id);
        debug!("pending take: id={id}, found={}", taken.is_some());
        taken
    }

    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.inner.lock().entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id of the longest-waiting entry.
    pub fn oldest(&self) -> Option<CorrelationId> {
        self.inner
            .lock()
            .entries
            .iter()
            .min_by_key(|(_, pending)| pending.sequence)
            .map(|(id, _)| id.clone())
    }

    /// Drops entries older than the configured TTL and returns their ids.
    /// A store without a TTL never expires anything.
    pub fn evict_expired(&self) -> Vec<CorrelationId> {
        let Some(ttl) = self.ttl else {
            return Vec::new();
        };

        let now = Instant::now();
        let mut inner = self.inner.lock();
        let mut expired: Vec<(u64, CorrelationId)> = inner
            .entries
            .iter()
            .filter(|(_, pending)| now.saturating_duration_since(pending.created_at) >= ttl)
            .map(|(id, pending)| (pending.sequence, id.clone()))
            .collect();
        expired.sort();

        for (_, id) in &expired {
            inner.entries.remove(id);
        }
        drop(inner);

        if !expired.is_empty() {
            warn!("evicted {} expired pending request(s)", expired.len());
        }
        expired.into_iter().map(|(_, id)| id).collect()
    }
}
