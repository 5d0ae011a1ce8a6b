//! Deterministic in-memory world.
//!
//! [`SimulatedWorld`] implements [`WorldPlatform`] over plain maps so the
//! scheduler can be driven end to end without a game server: terminal
//! sends move resources and charge energy fees, market deals move credits,
//! and every intent puts the acting terminal on cooldown. A world is
//! usually loaded from a YAML [`Scenario`].

use std::collections::BTreeMap;
use std::path::Path;

use commune_economy::allies::AllySegment;
use commune_economy::constants::TERMINAL_COOLDOWN;
use commune_economy::transaction::transfer_cost;
use commune_economy::{DefenseBrief, DefenseSubsystem, PlatformRejection, WorldPlatform};
use commune_types::{
    MarketOrder, OrderDirection, OrderId, Resource, StandingOrderRequest, TerminalState, ZoneName,
    ZoneState,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// Starting state of a simulated world.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Zones we own.
    #[serde(default)]
    pub zones: Vec<ZoneState>,

    /// Market state.
    #[serde(default)]
    pub market: MarketScenario,

    /// Ally segment published every tick until its requests are met.
    #[serde(default)]
    pub ally_segment: Option<AllySegment>,

    /// Platform intents allowed per tick before the CPU is spent.
    #[serde(default)]
    pub cpu_limit: Option<u32>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not a valid scenario.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not a valid scenario.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let scenario: Self = serde_yml::from_str(yaml)?;
        Ok(scenario)
    }
}

/// Market part of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketScenario {
    /// Whether the market accepts orders.
    #[serde(default = "default_true")]
    pub functional: bool,

    /// Starting credits.
    #[serde(default)]
    pub credits: Decimal,

    /// Recent average prices.
    #[serde(default)]
    pub prices: BTreeMap<Resource, Decimal>,

    /// Orders posted by other players.
    #[serde(default)]
    pub orders: Vec<ScenarioOrder>,
}

impl Default for MarketScenario {
    fn default() -> Self {
        Self {
            functional: true,
            credits: Decimal::ZERO,
            prices: BTreeMap::new(),
            orders: Vec::new(),
        }
    }
}

/// A foreign market order; its id is assigned on load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioOrder {
    /// Resource traded.
    pub resource: Resource,
    /// Whether the owner buys or sells.
    pub direction: OrderDirection,
    /// Price per unit.
    pub price: Decimal,
    /// Amount open.
    pub remaining: u32,
    /// Zone of the owner's terminal.
    pub zone: ZoneName,
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// An in-memory world platform.
#[derive(Debug, Clone, Default)]
pub struct SimulatedWorld {
    zones: BTreeMap<ZoneName, ZoneState>,
    market: Vec<MarketOrder>,
    own_orders: Vec<MarketOrder>,
    prices: BTreeMap<Resource, Decimal>,
    credits: Decimal,
    market_down: bool,
    ally_segment: Option<AllySegment>,
    cpu_limit: Option<u32>,
    cpu_used: u32,
}

impl SimulatedWorld {
    /// An empty world with a working market and no credits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from a scenario.
    pub fn from_scenario(scenario: Scenario) -> Self {
        let market = scenario
            .market
            .orders
            .into_iter()
            .map(|order| MarketOrder {
                id: OrderId::new(),
                resource: order.resource,
                direction: order.direction,
                price: order.price,
                remaining: order.remaining,
                zone: order.zone,
            })
            .collect();
        Self {
            zones: scenario
                .zones
                .into_iter()
                .map(|zone| (zone.name.clone(), zone))
                .collect(),
            market,
            own_orders: Vec::new(),
            prices: scenario.market.prices,
            credits: scenario.market.credits,
            market_down: !scenario.market.functional,
            ally_segment: scenario.ally_segment,
            cpu_limit: scenario.cpu_limit,
            cpu_used: 0,
        }
    }

    /// Add or replace a zone.
    pub fn add_zone(&mut self, zone: ZoneState) {
        self.zones.insert(zone.name.clone(), zone);
    }

    /// Lose a zone entirely.
    pub fn remove_zone(&mut self, name: &ZoneName) -> Option<ZoneState> {
        self.zones.remove(name)
    }

    /// Current state of a zone.
    pub fn zone(&self, name: &ZoneName) -> Option<&ZoneState> {
        self.zones.get(name)
    }

    /// Mutable state of a zone, for scripting scenarios.
    pub fn zone_mut(&mut self, name: &ZoneName) -> Option<&mut ZoneState> {
        self.zones.get_mut(name)
    }

    /// Post a foreign order.
    pub fn add_market_order(&mut self, order: MarketOrder) {
        self.market.push(order);
    }

    /// Foreign orders still open.
    pub fn market_orders(&self) -> &[MarketOrder] {
        &self.market
    }

    /// Standing orders we created.
    pub fn own_orders(&self) -> &[MarketOrder] {
        &self.own_orders
    }

    /// Set a resource's average price.
    pub fn set_price(&mut self, resource: Resource, price: Decimal) {
        self.prices.insert(resource, price);
    }

    /// Set the credit balance.
    pub const fn set_credits(&mut self, credits: Decimal) {
        self.credits = credits;
    }

    /// Publish (or withdraw) the ally segment.
    pub fn set_ally_segment(&mut self, segment: Option<AllySegment>) {
        self.ally_segment = segment;
    }

    /// Limit platform intents per tick.
    pub const fn set_cpu_limit(&mut self, limit: Option<u32>) {
        self.cpu_limit = limit;
    }

    /// Move the world to the next tick: terminals cool down and the CPU
    /// allowance resets.
    pub fn advance_tick(&mut self) {
        for zone in self.zones.values_mut() {
            if let Some(terminal) = zone.terminal.as_mut() {
                terminal.cooldown = terminal.cooldown.saturating_sub(1);
            }
        }
        self.cpu_used = 0;
    }

    fn spend_cpu(&mut self) {
        self.cpu_used = self.cpu_used.saturating_add(1);
    }

    /// Terminal energy and the fee for moving `amount` between two zones.
    fn ready_terminal(
        &self,
        zone: &ZoneName,
        other: &ZoneName,
        amount: u32,
    ) -> Result<(u32, u32), PlatformRejection> {
        let state = self.zones.get(zone).ok_or(PlatformRejection::NotOwner)?;
        let terminal = state.terminal.as_ref().ok_or(PlatformRejection::InvalidTarget)?;
        if terminal.cooldown > 0 {
            return Err(PlatformRejection::Tired);
        }
        if amount == 0 {
            return Err(PlatformRejection::InvalidArgs);
        }
        let distance = zone.linear_distance(other).ok_or(PlatformRejection::InvalidTarget)?;
        Ok((terminal.amount(Resource::Energy), transfer_cost(amount, distance)))
    }

    fn withdraw(&mut self, zone: &ZoneName, resource: Resource, amount: u32) {
        let Some(state) = self.zones.get_mut(zone) else {
            return;
        };
        if let Some(terminal) = state.terminal.as_mut() {
            let held = terminal.store.entry(resource).or_insert(0);
            *held = held.saturating_sub(amount);
        }
        let stored = state.stored.entry(resource).or_insert(0);
        *stored = stored.saturating_sub(amount);
    }

    fn deposit(&mut self, zone: &ZoneName, resource: Resource, amount: u32) {
        let Some(state) = self.zones.get_mut(zone) else {
            return;
        };
        if let Some(terminal) = state.terminal.as_mut() {
            let held = terminal.store.entry(resource).or_insert(0);
            *held = held.saturating_add(amount);
        }
        let stored = state.stored.entry(resource).or_insert(0);
        *stored = stored.saturating_add(amount);
    }

    fn start_cooldown(&mut self, zone: &ZoneName) {
        if let Some(terminal) = self.zones.get_mut(zone).and_then(|state| state.terminal.as_mut()) {
            terminal.cooldown = TERMINAL_COOLDOWN;
        }
    }

    /// Shrink the published ally requests a send to `destination` covers.
    fn settle_ally_request(&mut self, resource: Resource, amount: u32, destination: &ZoneName) {
        let Some(segment) = self.ally_segment.as_mut() else {
            return;
        };
        let mut left = amount;
        segment.requests.resource.retain(|_, request| {
            if left == 0
                || request.room_name != destination.as_str()
                || request.resource_type != resource.code()
            {
                return true;
            }
            let covered = left.min(request.amount);
            request.amount = request.amount.saturating_sub(covered);
            left = left.saturating_sub(covered);
            request.amount > 0
        });
    }
}

impl WorldPlatform for SimulatedWorld {
    fn zone_snapshots(&self) -> Vec<ZoneState> {
        self.zones.values().cloned().collect()
    }

    fn send(
        &mut self,
        from: &ZoneName,
        resource: Resource,
        amount: u32,
        destination: &ZoneName,
    ) -> Result<(), PlatformRejection> {
        self.spend_cpu();
        let (energy, fee) = self.ready_terminal(from, destination, amount)?;
        let held = self
            .zones
            .get(from)
            .and_then(|state| state.terminal.as_ref())
            .map_or(0, |terminal| terminal.amount(resource));

        let energy_needed = if resource == Resource::Energy {
            amount.checked_add(fee).ok_or(PlatformRejection::InvalidArgs)?
        } else {
            if held < amount {
                return Err(PlatformRejection::NotEnoughResources);
            }
            fee
        };
        if energy < energy_needed {
            return Err(PlatformRejection::NotEnoughResources);
        }
        let room = self
            .zones
            .get(destination)
            .and_then(|state| state.terminal.as_ref())
            .map(TerminalState::free_capacity);
        if room.is_some_and(|free| free < amount) {
            return Err(PlatformRejection::Full);
        }

        self.withdraw(from, resource, amount);
        self.withdraw(from, Resource::Energy, fee);
        self.start_cooldown(from);
        if self.zones.contains_key(destination) {
            self.deposit(destination, resource, amount);
        } else {
            self.settle_ally_request(resource, amount, destination);
        }
        debug!(from = %from, to = %destination, %resource, amount, fee, "Simulated send");
        Ok(())
    }

    fn best_sell_order(&self, resource: Resource, max_price: Option<Decimal>) -> Option<MarketOrder> {
        self.market
            .iter()
            .filter(|order| order.direction == OrderDirection::Sell && order.resource == resource)
            .filter(|order| max_price.is_none_or(|max| order.price <= max))
            .min_by(|a, b| a.price.cmp(&b.price))
            .cloned()
    }

    fn best_buy_order(&self, resource: Resource, min_price: Option<Decimal>) -> Option<MarketOrder> {
        self.market
            .iter()
            .filter(|order| order.direction == OrderDirection::Buy && order.resource == resource)
            .filter(|order| min_price.is_none_or(|min| order.price >= min))
            .max_by(|a, b| a.price.cmp(&b.price))
            .cloned()
    }

    fn deal(&mut self, order: OrderId, amount: u32, zone: &ZoneName) -> Result<(), PlatformRejection> {
        self.spend_cpu();
        let index = self
            .market
            .iter()
            .position(|open| open.id == order)
            .ok_or(PlatformRejection::UnknownOrder)?;
        let open = self.market.get(index).cloned().ok_or(PlatformRejection::UnknownOrder)?;
        if amount > open.remaining {
            return Err(PlatformRejection::InvalidArgs);
        }
        let (energy, fee) = self.ready_terminal(zone, &open.zone, amount)?;
        let value = open
            .price
            .checked_mul(Decimal::from(amount))
            .ok_or(PlatformRejection::InvalidArgs)?;

        match open.direction {
            // We buy from their sell order.
            OrderDirection::Sell => {
                if self.credits < value {
                    return Err(PlatformRejection::NotEnoughResources);
                }
                if energy < fee {
                    return Err(PlatformRejection::NotEnoughResources);
                }
                self.credits = self.credits.saturating_sub(value);
                self.withdraw(zone, Resource::Energy, fee);
                self.deposit(zone, open.resource, amount);
            }
            // We sell into their buy order.
            OrderDirection::Buy => {
                let held = self
                    .zones
                    .get(zone)
                    .and_then(|state| state.terminal.as_ref())
                    .map_or(0, |terminal| terminal.amount(open.resource));
                let energy_needed = if open.resource == Resource::Energy {
                    amount.saturating_add(fee)
                } else {
                    fee
                };
                if held < amount || energy < energy_needed {
                    return Err(PlatformRejection::NotEnoughResources);
                }
                self.withdraw(zone, open.resource, amount);
                self.withdraw(zone, Resource::Energy, fee);
                self.credits = self.credits.saturating_add(value);
            }
        }

        let remaining = open.remaining.saturating_sub(amount);
        if remaining == 0 {
            self.market.remove(index);
        } else if let Some(entry) = self.market.get_mut(index) {
            entry.remaining = remaining;
        }
        self.start_cooldown(zone);
        debug!(zone = %zone, %order, amount, fee, %value, "Simulated deal");
        Ok(())
    }

    fn create_order(&mut self, order: &StandingOrderRequest) -> Result<OrderId, PlatformRejection> {
        self.spend_cpu();
        if !self.zones.contains_key(&order.zone) {
            return Err(PlatformRejection::NotOwner);
        }
        if order.amount == 0 || order.price <= Decimal::ZERO {
            return Err(PlatformRejection::InvalidArgs);
        }
        let id = OrderId::new();
        self.own_orders.push(MarketOrder {
            id,
            resource: order.resource,
            direction: order.direction,
            price: order.price,
            remaining: order.amount,
            zone: order.zone.clone(),
        });
        debug!(zone = %order.zone, %id, resource = %order.resource, "Simulated order created");
        Ok(id)
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
        self.own_orders.len()
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

    fn cpu_exhausted(&self) -> bool {
        self.cpu_limit.is_some_and(|limit| self.cpu_used >= limit)
    }

    fn read_ally_segment(&self) -> Option<String> {
        let segment = self.ally_segment.as_ref()?;
        serde_json::to_string(segment).ok()
    }
}

// ---------------------------------------------------------------------------
// Defense
// ---------------------------------------------------------------------------

/// A defense subsystem that keeps the latest brief per zone.
#[derive(Debug, Clone, Default)]
pub struct RecordingDefense {
    /// Latest brief per zone.
    pub briefs: BTreeMap<ZoneName, DefenseBrief>,
}

impl DefenseSubsystem for RecordingDefense {
    fn receive_brief(&mut self, zone: &ZoneName, brief: &DefenseBrief) {
        self.briefs.insert(zone.clone(), brief.clone());
    }
}
