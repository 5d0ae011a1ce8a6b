//! A scripted [`WorldPlatform`] for unit tests.

use std::collections::BTreeMap;

use commune_types::{
    MarketOrder, OrderDirection, OrderId, Resource, StandingOrderRequest, ZoneName, ZoneState,
};
use rust_decimal::Decimal;

use crate::error::PlatformRejection;
use crate::platform::WorldPlatform;

/// Records every intent and answers queries from fixed tables.
#[derive(Debug, Default)]
pub struct MockPlatform {
    pub zones: Vec<ZoneState>,
    pub market_orders: Vec<MarketOrder>,
    pub own_orders: Vec<MarketOrder>,
    pub extra_order_count: usize,
    pub prices: BTreeMap<Resource, Decimal>,
    pub credits: Decimal,
    pub market_down: bool,
    pub reject_with: Option<PlatformRejection>,

    pub sent: Vec<(ZoneName, Resource, u32, ZoneName)>,
    pub deals: Vec<(OrderId, u32, ZoneName)>,
    pub created: Vec<StandingOrderRequest>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            credits: Decimal::from(1_000_000),
            ..Self::default()
        }
    }

    pub fn order(
        zone: &str,
        direction: OrderDirection,
        resource: Resource,
        price: Decimal,
        remaining: u32,
    ) -> MarketOrder {
        MarketOrder {
            id: OrderId::new(),
            resource,
            direction,
            price,
            remaining,
            zone: ZoneName::from(zone),
        }
    }

    fn check(&self) -> Result<(), PlatformRejection> {
        self.reject_with.clone().map_or(Ok(()), Err)
    }
}

impl WorldPlatform for MockPlatform {
    fn zone_snapshots(&self) -> Vec<ZoneState> {
        self.zones.clone()
    }

    fn send(
        &mut self,
        from: &ZoneName,
        resource: Resource,
        amount: u32,
        destination: &ZoneName,
    ) -> Result<(), PlatformRejection> {
        self.check()?;
        self.sent.push((from.clone(), resource, amount, destination.clone()));
        Ok(())
    }

    fn best_sell_order(&self, resource: Resource, max_price: Option<Decimal>) -> Option<MarketOrder> {
        self.market_orders
            .iter()
            .filter(|order| order.direction == OrderDirection::Sell && order.resource == resource)
            .filter(|order| max_price.is_none_or(|max| order.price <= max))
            .min_by(|a, b| a.price.cmp(&b.price))
            .cloned()
    }

    fn best_buy_order(&self, resource: Resource, min_price: Option<Decimal>) -> Option<MarketOrder> {
        self.market_orders
            .iter()
            .filter(|order| order.direction == OrderDirection::Buy && order.resource == resource)
            .filter(|order| min_price.is_none_or(|min| order.price >= min))
            .max_by(|a, b| a.price.cmp(&b.price))
            .cloned()
    }

    fn deal(&mut self, order: OrderId, amount: u32, zone: &ZoneName) -> Result<(), PlatformRejection> {
        self.check()?;
        self.deals.push((order, amount, zone.clone()));
        Ok(())
    }

    fn create_order(&mut self, order: &StandingOrderRequest) -> Result<OrderId, PlatformRejection> {
        self.check()?;
        self.created.push(order.clone());
        Ok(OrderId::new())
    }

    fn my_orders(
        &self,
        zone: &ZoneName,
        direction: OrderDirection,
        resource: Resource,
    ) -> Vec<MarketOrder> {
        self.own_orders
            .iter()
            .filter(|order| {
                order.zone == *zone && order.direction == direction && order.resource == resource
            })
            .cloned()
            .collect()
    }

    fn order_count(&self) -> usize {
        self.own_orders
            .len()
            .saturating_add(self.extra_order_count)
            .saturating_add(self.created.len())
    }

    fn average_price(&self, resource: Resource) -> Option<Decimal> {
        self.prices.get(&resource).copied()
    }

    fn credits(&self) -> Decimal {
        self.credits
    }

    fn market_functional(&self) -> bool {
        !self.market_down
    }
}
