//! Integration tests for the tick cycle.
//!
//! Each test builds a small [`SimulatedWorld`], runs whole ticks through
//! [`run_tick`], and checks what the terminals did and what was left in
//! the shared registries.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_panics_doc,
    clippy::panic
)]

use std::collections::BTreeMap;

use commune_core::memory::SchedulerMemory;
use commune_core::sim::{RecordingDefense, SimulatedWorld};
use commune_core::tick::{SchedulerState, TickSummary, ZoneDecision, run_tick};
use commune_economy::allies::AllySegment;
use commune_economy::matching::select_best;
use commune_economy::{
    Commune, NoActionReason, PeriodicRefresh, StageResult, TradeSettings, WorldPlatform,
};
use commune_types::{
    MarketOrder, OrderDirection, OrderId, RequestId, RequestKey, RequestOrigin, Resource,
    StorageState, TerminalAction, TerminalState, TransferRequest, ZoneName, ZoneState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A planned level-6 zone with storage and a terminal holding `terminal_energy`.
fn zone(name: &str, stored_energy: u32, terminal_energy: u32) -> ZoneState {
    let mut zone = ZoneState::new(name, 6);
    zone.storage = Some(StorageState { capacity: 1_000_000 });
    let mut terminal = TerminalState {
        capacity: 300_000,
        ..TerminalState::default()
    };
    terminal.store.insert(Resource::Energy, terminal_energy);
    zone.terminal = Some(terminal);
    zone.stored.insert(Resource::Energy, stored_energy);
    zone.defense.perimeter = Some(Vec::new());
    zone.defense.rampart_plans = Some(Vec::new());
    zone
}

fn reserve() -> u32 {
    let reserve = Commune::new(zone("W1N1", 0, 0)).min_stored_energy();
    u32::try_from(reserve).unwrap()
}

/// Plenty of stored energy, but only 800 in the terminal: a fee budget of 800.
fn donor(name: &str) -> ZoneState {
    zone(name, reserve() * 2, 800)
}

/// A zone that never posts or answers requests itself.
fn receiver(name: &str) -> ZoneState {
    let mut zone = zone(name, 0, 0);
    if let Some(terminal) = zone.terminal.as_mut() {
        terminal.actionable = false;
    }
    zone
}

fn energy_request(zone: &str, amount: u32, priority: Decimal) -> TransferRequest {
    TransferRequest {
        zone: ZoneName::from(zone),
        resource: Resource::Energy,
        amount,
        priority,
        origin: RequestOrigin::Internal,
    }
}

fn scheduler() -> SchedulerState {
    SchedulerState::new(TradeSettings::default(), Box::new(PeriodicRefresh::new(20)))
}

fn tick(state: &mut SchedulerState, world: &mut SimulatedWorld) -> TickSummary {
    let mut defense = RecordingDefense::default();
    let summary = run_tick(state, world, &mut defense).unwrap();
    world.advance_tick();
    summary
}

fn decision<'a>(summary: &'a TickSummary, zone: &str) -> Option<&'a ZoneDecision> {
    summary.decisions.get(&ZoneName::from(zone))
}

fn stored_energy(world: &SimulatedWorld, zone: &str) -> u32 {
    world
        .zone(&ZoneName::from(zone))
        .unwrap()
        .stored_amount(Resource::Energy)
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[test]
fn internal_request_is_fulfilled_end_to_end() {
    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.add_zone(receiver("W4N1"));

    let mut state = scheduler();
    let id = state.registry.post(energy_request("W4N1", 500, dec!(0.4)));

    // Distance 3, priority 0.4: score 43, and the full 500 fits an 800 budget.
    let surplus = BTreeMap::from([(Resource::Energy, 10_000)]);
    let candidate = select_best(800.0, &surplus, state.registry.iter(), |_| 3).unwrap();
    assert_eq!(candidate.score, dec!(43));
    assert_eq!(candidate.amount, 500);

    let summary = tick(&mut state, &mut world);

    assert_eq!(
        decision(&summary, "W1N1"),
        Some(&ZoneDecision::Terminal(StageResult::Matched(TerminalAction::Send {
            resource: Resource::Energy,
            amount: 500,
            destination: ZoneName::from("W4N1"),
            request: RequestKey::Internal(id),
        })))
    );
    assert!(state.registry.get(&id).is_none());
    assert_eq!(stored_energy(&world, "W4N1"), 500);
    assert_eq!(stored_energy(&world, "W1N1"), reserve() * 2 - 500 - 48);
}

#[test]
fn oversized_request_is_trimmed_to_what_the_terminal_can_pay_for() {
    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.add_zone(receiver("W4N1"));

    let settings = TradeSettings {
        market_usage: false,
        ..TradeSettings::default()
    };
    let mut state = SchedulerState::new(settings, Box::new(PeriodicRefresh::new(20)));
    let id = state.registry.post(energy_request("W4N1", 1000, dec!(0.4)));

    // 730 plus its fee of 70 uses the whole 800 in the terminal.
    let summary = tick(&mut state, &mut world);
    assert_eq!(
        decision(&summary, "W1N1"),
        Some(&ZoneDecision::Terminal(StageResult::Matched(TerminalAction::Send {
            resource: Resource::Energy,
            amount: 730,
            destination: ZoneName::from("W4N1"),
            request: RequestKey::Internal(id),
        })))
    );
    assert!(state.registry.get(&id).is_none());
    assert_eq!(stored_energy(&world, "W4N1"), 730);
    assert_eq!(stored_energy(&world, "W1N1"), reserve() * 2 - 800);
}

#[test]
fn a_terminal_acts_at_most_once_per_tick() {
    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.add_zone(receiver("W2N1"));
    world.add_zone(receiver("W3N1"));

    let mut state = scheduler();
    state.registry.post(energy_request("W2N1", 300, dec!(0.5)));
    state.registry.post(energy_request("W3N1", 300, dec!(0.5)));

    let first = tick(&mut state, &mut world);
    assert_eq!(first.actions(), 1);
    assert_eq!(state.registry.len(), 1);

    let second = tick(&mut state, &mut world);
    assert_eq!(
        decision(&second, "W1N1"),
        Some(&ZoneDecision::Terminal(StageResult::NoAction(NoActionReason::Cooldown)))
    );
    assert_eq!(state.registry.len(), 1);
}

#[test]
fn ally_request_is_answered_when_no_internal_request_fits() {
    let segment: AllySegment = serde_json::from_str(
        r#"{"requests":{"resource":{"a1":{"resourceType":"energy","amount":400,"roomName":"W3N3","priority":0.2}}}}"#,
    )
    .unwrap();
    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.set_ally_segment(Some(segment));

    let mut state = scheduler();
    let summary = tick(&mut state, &mut world);

    let Some(ZoneDecision::Terminal(StageResult::Matched(TerminalAction::Send {
        amount,
        destination,
        request,
        ..
    }))) = decision(&summary, "W1N1")
    else {
        panic!("expected an ally send, got {summary:?}");
    };
    assert_eq!(*amount, 400);
    assert_eq!(destination, &ZoneName::from("W3N3"));
    assert_eq!(request, &RequestKey::Allied("a1".to_owned()));
}

#[test]
fn ally_requests_are_ignored_when_switched_off() {
    let segment: AllySegment = serde_json::from_str(
        r#"{"requests":{"resource":{"a1":{"resourceType":"energy","amount":400,"roomName":"W3N3","priority":0.2}}}}"#,
    )
    .unwrap();
    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.set_ally_segment(Some(segment));

    let settings = TradeSettings {
        ally_communication: false,
        market_usage: false,
        ..TradeSettings::default()
    };
    let mut state = SchedulerState::new(settings, Box::new(PeriodicRefresh::new(20)));
    let summary = tick(&mut state, &mut world);
    assert_eq!(summary.actions(), 0);
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[test]
fn short_zone_buys_from_the_cheapest_sell_order() {
    let mut zone = zone("W1N1", 100_000, 100_000);
    zone.facilities.labs = 1;

    let mut world = SimulatedWorld::new();
    world.add_zone(zone);
    world.set_credits(dec!(100000));
    world.set_price(Resource::Hydrogen, dec!(2));
    let cheap = OrderId::new();
    for (id, price) in [(OrderId::new(), dec!(2.3)), (cheap, dec!(1.9)), (OrderId::new(), dec!(2.5))] {
        world.add_market_order(MarketOrder {
            id,
            resource: Resource::Hydrogen,
            direction: OrderDirection::Sell,
            price,
            remaining: 4000,
            zone: ZoneName::from("W5N5"),
        });
    }

    let mut state = scheduler();
    let summary = tick(&mut state, &mut world);

    assert_eq!(
        decision(&summary, "W1N1"),
        Some(&ZoneDecision::Terminal(StageResult::Matched(TerminalAction::Deal {
            order: cheap,
            resource: Resource::Hydrogen,
            direction: OrderDirection::Buy,
            amount: 4000,
        })))
    );
    assert_eq!(world.credits(), dec!(100000) - dec!(7600));
    let hydrogen = world
        .zone(&ZoneName::from("W1N1"))
        .unwrap()
        .stored_amount(Resource::Hydrogen);
    assert_eq!(hydrogen, 4000);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn abandoning_a_zone_purges_its_requests() {
    let mut world = SimulatedWorld::new();
    world.add_zone(receiver("W4N1"));
    let mut state = scheduler();
    tick(&mut state, &mut world);

    state.registry.post(energy_request("W4N1", 500, dec!(0.4)));
    world.zone_mut(&ZoneName::from("W4N1")).unwrap().abandoned = true;

    let summary = tick(&mut state, &mut world);
    assert_eq!(summary.abandoned, vec![ZoneName::from("W4N1")]);
    assert!(state.registry.is_empty());
    assert!(state.communes.is_empty());
}

#[test]
fn missing_plans_halt_only_that_zone() {
    let mut unplanned = receiver("W2N1");
    unplanned.defense.perimeter = None;

    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.add_zone(unplanned);
    world.add_zone(receiver("W4N1"));

    let mut state = scheduler();
    state.registry.post(energy_request("W4N1", 500, dec!(0.4)));
    let mut defense = RecordingDefense::default();
    let summary = run_tick(&mut state, &mut world, &mut defense).unwrap();

    assert!(matches!(
        decision(&summary, "W2N1"),
        Some(ZoneDecision::Halted { .. })
    ));
    assert_eq!(summary.actions(), 1);
    assert!(defense.briefs.contains_key(&ZoneName::from("W1N1")));
    assert!(defense.briefs.contains_key(&ZoneName::from("W4N1")));
    assert!(!defense.briefs.contains_key(&ZoneName::from("W2N1")));
}

#[test]
fn exhausted_cpu_stops_between_zones() {
    let mut world = SimulatedWorld::new();
    world.add_zone(donor("W1N1"));
    world.add_zone(donor("W2N1"));
    world.add_zone(receiver("W4N1"));
    world.set_cpu_limit(Some(1));

    let mut state = scheduler();
    state.registry.post(energy_request("W4N1", 300, dec!(0.5)));
    let summary = tick(&mut state, &mut world);

    assert!(summary.interrupted);
    assert!(decision(&summary, "W1N1").is_some());
    assert!(decision(&summary, "W2N1").is_none());
    assert!(decision(&summary, "W4N1").is_none());
}

#[test]
fn memory_carries_requests_across_a_restart() {
    let mut world = SimulatedWorld::new();
    world.add_zone(receiver("W4N1"));

    let mut state = scheduler();
    let id: RequestId = state.registry.post(energy_request("W4N1", 500, dec!(0.4)));
    tick(&mut state, &mut world);

    let raw = SchedulerMemory::capture(&state).to_json().unwrap();
    let mut restored = SchedulerMemory::from_json(&raw)
        .unwrap()
        .restore(TradeSettings::default(), Box::new(PeriodicRefresh::new(20)));

    world.add_zone(donor("W1N1"));
    let summary = tick(&mut restored, &mut world);
    assert_eq!(summary.tick, 2);
    assert!(restored.registry.get(&id).is_none());
    assert_eq!(stored_energy(&world, "W4N1"), 500);
}
