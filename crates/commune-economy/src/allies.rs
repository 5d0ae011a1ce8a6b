//! The allied request channel.
//!
//! Allies publish their resource requests in a shared JSON segment, shaped
//! `{"requests": {"resource": {"<id>": {"resourceType", "amount",
//! "roomName", "priority"}}}}`. The scheduler reads it once per tick. When
//! no segment was published, allied matching is skipped for that tick.

use std::collections::BTreeMap;

use commune_types::{RequestOrigin, Resource, TransferRequest, ZoneName};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EconomyError;

/// One allied resource request, as published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllyResourceRequest {
    /// Resource code, e.g. `"energy"` or `"H"`.
    pub resource_type: String,
    /// Amount asked for.
    pub amount: u32,
    /// Zone the resource should be sent to.
    pub room_name: String,
    /// Urgency in `[0, 1]`.
    pub priority: Decimal,
}

/// Request lists of an ally segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllyRequests {
    /// Resource requests by ally-assigned id.
    #[serde(default)]
    pub resource: BTreeMap<String, AllyResourceRequest>,
}

/// A published ally segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllySegment {
    /// Requests by kind.
    #[serde(default)]
    pub requests: AllyRequests,
}

/// This tick's view of allied requests.
#[derive(Debug, Clone, Default)]
pub struct AlliedChannel {
    requests: Option<BTreeMap<String, TransferRequest>>,
}

impl AlliedChannel {
    /// A channel with nothing delivered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous tick's segment.
    pub fn clear(&mut self) {
        self.requests = None;
    }

    /// Accept a parsed segment. Requests for unknown resources are dropped.
    /// Returns how many requests were accepted.
    pub fn deliver(&mut self, segment: AllySegment) -> usize {
        let mut requests = BTreeMap::new();
        for (id, request) in segment.requests.resource {
            let Some(resource) = Resource::from_code(&request.resource_type) else {
                debug!(id = %id, resource = %request.resource_type, "Skipping ally request for unknown resource");
                continue;
            };
            requests.insert(
                id,
                TransferRequest {
                    zone: ZoneName::from(request.room_name),
                    resource,
                    amount: request.amount,
                    priority: request.priority,
                    origin: RequestOrigin::Allied,
                },
            );
        }
        let accepted = requests.len();
        self.requests = Some(requests);
        accepted
    }

    /// Parse and accept a raw JSON segment.
    ///
    /// # Errors
    ///
    /// [`EconomyError::AllySegment`] when the JSON does not match the
    /// segment shape. The channel is left undelivered.
    pub fn deliver_json(&mut self, raw: &str) -> Result<usize, EconomyError> {
        self.requests = None;
        let segment: AllySegment = serde_json::from_str(raw)?;
        Ok(self.deliver(segment))
    }

    /// Whether a segment was delivered this tick.
    pub const fn is_delivered(&self) -> bool {
        self.requests.is_some()
    }

    /// Delivered requests in id order. Empty when nothing was delivered.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TransferRequest)> {
        self.requests.iter().flat_map(BTreeMap::iter)
    }

    /// Remove and return a request so no other zone answers it.
    pub fn take(&mut self, id: &str) -> Option<TransferRequest> {
        self.requests.as_mut()?.remove(id)
    }

    /// Put back a request whose fulfilment was rejected.
    pub fn restore(&mut self, id: String, request: TransferRequest) {
        if let Some(requests) = self.requests.as_mut() {
            requests.insert(id, request);
        }
    }
}
