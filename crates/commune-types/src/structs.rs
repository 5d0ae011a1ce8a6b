//! Requests, market orders, and terminal actions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{OrderDirection, RequestOrigin, Resource};
use crate::ids::{OrderId, RequestId};
use crate::zone::ZoneName;

// ---------------------------------------------------------------------------
// Transfer requests
// ---------------------------------------------------------------------------

/// An outstanding ask for a resource, posted by a zone (ours or an ally's).
///
/// Requests are immutable once posted. Fulfilling one deletes it; a zone
/// that changes its mind posts a fresh request under a new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Zone asking for the resource.
    pub zone: ZoneName,
    /// Resource asked for.
    pub resource: Resource,
    /// Amount asked for.
    pub amount: u32,
    /// Urgency in `[0, 1]`, two decimal places. Higher is more urgent.
    pub priority: Decimal,
    /// Channel the request arrived through.
    pub origin: RequestOrigin,
}

/// Key of a request in whichever store holds it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKey {
    /// Key in the internal registry.
    Internal(RequestId),
    /// Key in the allied segment (assigned by the ally).
    Allied(String),
}

impl core::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Internal(id) => write!(f, "internal:{id}"),
            Self::Allied(id) => write!(f, "allied:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Market orders
// ---------------------------------------------------------------------------

/// An order on the open market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    /// Order id.
    pub id: OrderId,
    /// Resource traded.
    pub resource: Resource,
    /// Whether the owner buys or sells.
    pub direction: OrderDirection,
    /// Price per unit in credits.
    pub price: Decimal,
    /// Amount still open.
    pub remaining: u32,
    /// Zone the order's terminal sits in; transfer fees are charged by
    /// distance to it.
    pub zone: ZoneName,
}

/// Parameters for posting a new standing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingOrderRequest {
    /// Zone whose terminal backs the order.
    pub zone: ZoneName,
    /// Buy or sell.
    pub direction: OrderDirection,
    /// Resource traded.
    pub resource: Resource,
    /// Price per unit in credits.
    pub price: Decimal,
    /// Total amount.
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// Terminal actions
// ---------------------------------------------------------------------------

/// The single outbound action a zone's terminal takes in a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalAction {
    /// Resources sent to fulfil a transfer request.
    Send {
        /// Resource sent.
        resource: Resource,
        /// Amount sent.
        amount: u32,
        /// Receiving zone.
        destination: ZoneName,
        /// Request that was fulfilled (and deleted).
        request: RequestKey,
    },
    /// A deal executed against someone else's market order.
    Deal {
        /// Order dealt with.
        order: OrderId,
        /// Resource traded.
        resource: Resource,
        /// Whether we bought or sold.
        direction: OrderDirection,
        /// Amount traded.
        amount: u32,
    },
    /// A new standing order posted by this zone.
    CreateOrder(StandingOrderRequest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_action_serializes_with_kind_tag() {
        let action = TerminalAction::Send {
            resource: Resource::Energy,
            amount: 500,
            destination: ZoneName::from("W1N1"),
            request: RequestKey::Allied(String::from("abc")),
        };
        let json = serde_json::to_value(&action).ok();
        assert_eq!(
            json.as_ref().and_then(|v| v.get("kind")).and_then(|v| v.as_str()),
            Some("send")
        );
    }

    #[test]
    fn request_key_display() {
        assert_eq!(RequestKey::Allied(String::from("7")).to_string(), "allied:7");
    }
}
