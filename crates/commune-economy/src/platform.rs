//! Collaborator traits: the world platform and the defense subsystem.
//!
//! The scheduler never touches world state directly. Every read beyond the
//! zone snapshot and every intent (send, deal, order) goes through
//! [`WorldPlatform`], which lets the same scheduling code drive the live
//! game or the deterministic in-memory harness.

use commune_types::{
    MarketOrder, OrderDirection, OrderId, Resource, StandingOrderRequest, ZoneName, ZoneState,
};
use rust_decimal::Decimal;

use crate::defense::DefenseBrief;
use crate::error::PlatformRejection;

/// The world the scheduler runs against.
pub trait WorldPlatform {
    /// Snapshots of every zone we own, taken at the start of the tick.
    fn zone_snapshots(&self) -> Vec<ZoneState>;

    /// Grid distance between two zones.
    ///
    /// Names that do not encode a grid position are treated as infinitely
    /// far apart.
    fn linear_distance(&self, from: &ZoneName, to: &ZoneName) -> u32 {
        from.linear_distance(to).unwrap_or(u32::MAX)
    }

    /// Send `amount` of `resource` from `from`'s terminal to `destination`.
    /// The transfer fee is charged in energy on top of the amount.
    fn send(
        &mut self,
        from: &ZoneName,
        resource: Resource,
        amount: u32,
        destination: &ZoneName,
    ) -> Result<(), PlatformRejection>;

    /// Cheapest visible sell order for `resource`, optionally capped at
    /// `max_price`.
    fn best_sell_order(&self, resource: Resource, max_price: Option<Decimal>)
    -> Option<MarketOrder>;

    /// Highest visible buy order for `resource`, optionally floored at
    /// `min_price`.
    fn best_buy_order(&self, resource: Resource, min_price: Option<Decimal>)
    -> Option<MarketOrder>;

    /// Execute `amount` against someone else's order through `zone`'s
    /// terminal.
    fn deal(&mut self, order: OrderId, amount: u32, zone: &ZoneName)
    -> Result<(), PlatformRejection>;

    /// Post a new standing order.
    fn create_order(&mut self, order: &StandingOrderRequest) -> Result<OrderId, PlatformRejection>;

    /// Our open orders for one zone, direction, and resource.
    fn my_orders(
        &self,
        zone: &ZoneName,
        direction: OrderDirection,
        resource: Resource,
    ) -> Vec<MarketOrder>;

    /// Number of standing orders we own across all zones.
    fn order_count(&self) -> usize;

    /// Recent average market price of `resource`, if it has traded.
    fn average_price(&self, resource: Resource) -> Option<Decimal>;

    /// Credits available for buying.
    fn credits(&self) -> Decimal;

    /// Whether the market accepts orders on this server.
    fn market_functional(&self) -> bool;

    /// Whether the tick's CPU allowance is spent. Checked between zones.
    fn cpu_exhausted(&self) -> bool {
        false
    }

    /// Raw JSON of the allied communication segment, if one was published
    /// for this tick.
    fn read_ally_segment(&self) -> Option<String> {
        None
    }
}

/// The zone defense system, fed once per zone per tick.
pub trait DefenseSubsystem {
    /// Receive the defense brief computed for `zone`.
    fn receive_brief(&mut self, zone: &ZoneName, brief: &DefenseBrief);
}
