//! The internal request registry and request generation.
//!
//! Zones that run short of a governed resource post a [`TransferRequest`]
//! into a registry shared by every commune. Any other zone with surplus
//! may fulfil it later in the same tick. Requests are never edited: a
//! fulfilled request is taken out, and a zone that re-posts for the same
//! resource replaces its old request with a new one.

use std::collections::BTreeMap;

use commune_types::{RequestId, RequestOrigin, Resource, TransferRequest, ZoneName};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commune::Commune;
use crate::targets;

/// Shared store of outstanding internal requests, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestRegistry {
    requests: BTreeMap<RequestId, TransferRequest>,
}

impl RequestRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no requests are outstanding.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Look up a request.
    pub fn get(&self, id: &RequestId) -> Option<&TransferRequest> {
        self.requests.get(id)
    }

    /// Outstanding requests in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &TransferRequest)> {
        self.requests.iter()
    }

    /// Store a request under an existing id.
    pub fn insert(&mut self, id: RequestId, request: TransferRequest) {
        self.requests.insert(id, request);
    }

    /// Post a request under a fresh id, replacing any unconsumed request of
    /// the same zone for the same resource.
    pub fn post(&mut self, request: TransferRequest) -> RequestId {
        self.requests
            .retain(|_, existing| !(existing.zone == request.zone && existing.resource == request.resource));
        let id = RequestId::new();
        self.requests.insert(id, request);
        id
    }

    /// Remove and return a request. A request can be taken at most once.
    pub fn take(&mut self, id: &RequestId) -> Option<TransferRequest> {
        self.requests.remove(id)
    }

    /// Drop every request posted by `zone`. Returns how many were dropped.
    pub fn purge_zone(&mut self, zone: &ZoneName) -> usize {
        let before = self.requests.len();
        self.requests.retain(|_, request| request.zone != *zone);
        before.saturating_sub(self.requests.len())
    }
}

/// Post requests for every governed resource `commune` is short of.
///
/// Only zones with an actionable terminal post. For each eligible resource
/// with a positive minimum, the zone asks to be topped up to 110% of the
/// minimum, bounded by its terminal's free space. Priority is the
/// fraction of that target still missing, rounded to two decimals.
pub fn create_terminal_requests(commune: &mut Commune, registry: &mut RequestRegistry) -> Vec<RequestId> {
    let Some(terminal) = commune.state().terminal.as_ref() else {
        return Vec::new();
    };
    if !terminal.actionable {
        return Vec::new();
    }
    let free_capacity = terminal.free_capacity();

    let mut posted = Vec::new();
    for target in targets::targets(commune) {
        if target.min == 0 || !target.eligible {
            continue;
        }

        let target_amount = inflate(target.min);
        let stock = commune.stored(target.resource);
        if stock >= target_amount {
            continue;
        }

        let amount = target_amount.saturating_sub(stock).min(free_capacity);
        if amount == 0 {
            continue;
        }
        let Some(priority) = priority(stock, target_amount) else {
            continue;
        };

        let zone = commune.name().clone();
        debug!(zone = %zone, resource = %target.resource, amount, %priority, "Posting terminal request");
        posted.push(registry.post(TransferRequest {
            zone,
            resource: target.resource,
            amount,
            priority,
            origin: RequestOrigin::Internal,
        }));
    }
    posted
}

/// `floor(min * 1.1)`.
fn inflate(min: u32) -> u32 {
    let inflated = u64::from(min).saturating_mul(11) / 10;
    u32::try_from(inflated).unwrap_or(u32::MAX)
}

/// `round(1 - stock / target, 2)`.
fn priority(stock: u32, target: u32) -> Option<Decimal> {
    let filled = Decimal::from(stock).checked_div(Decimal::from(target))?;
    let missing = Decimal::ONE.checked_sub(filled)?;
    Some(missing.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Whether `resource` requests from `zone` are outstanding.
pub fn has_request(registry: &RequestRegistry, zone: &ZoneName, resource: Resource) -> bool {
    registry
        .iter()
        .any(|(_, request)| request.zone == *zone && request.resource == resource)
}
