//! Derived metrics cache.
//!
//! Downstream systems ask a commune for the same thresholds many times per
//! tick. Each metric is computed on first access within its invalidation
//! epoch and memoized in a [`Slot`]. Two epochs exist:
//!
//! - the **tick epoch** advances every tick and invalidates reserve
//!   energy, storing structures, combat capacity, and rampart lists;
//! - the **slow epoch** advances only when the refresh policy fires and
//!   invalidates rampart hit targets and upgrade throughput.
//!
//! The build-priority ordering is computed once per commune and kept.
//!
//! Every computation bumps a per-metric counter so idempotence can be
//! observed from outside.

use std::collections::{BTreeMap, BTreeSet};

use commune_types::{
    ContainerSite, Coord, LinkSite, StoringStructure, StructureId, StructureKind, ZoneState,
};

use crate::constants::{
    DEFAULT_MIN_RAMPART_HITS, LINK_CAPACITY, LINK_LOSS_RATIO, LINK_UPGRADE_SHARE,
    NUDE_UPGRADE_STRENGTH, THREAT_RAMPARTS_THRESHOLD, rampart_hits_max,
};
use crate::error::EconomyError;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// A memoized value tagged with the epoch it was computed in.
///
/// "Computed" and "value" are kept apart: a slot holding `Some((epoch, 0))`
/// is a cached zero, not a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    entry: Option<(u64, T)>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    /// An empty slot.
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// The cached value, if it belongs to `epoch`.
    pub fn get(&self, epoch: u64) -> Option<&T> {
        match &self.entry {
            Some((computed_in, value)) if *computed_in == epoch => Some(value),
            _ => None,
        }
    }

    /// Return the value for `epoch`, computing it if the slot is stale.
    pub fn get_or_insert_with(&mut self, epoch: u64, compute: impl FnOnce() -> T) -> &T {
        let value = match self.entry.take() {
            Some((computed_in, value)) if computed_in == epoch => value,
            _ => compute(),
        };
        &self.entry.insert((epoch, value)).1
    }

    /// Fallible [`get_or_insert_with`](Self::get_or_insert_with). On error
    /// the slot is left empty.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        epoch: u64,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        let value = match self.entry.take() {
            Some((computed_in, value)) if computed_in == epoch => value,
            _ => compute()?,
        };
        Ok(&self.entry.insert((epoch, value)).1)
    }
}

// ---------------------------------------------------------------------------
// Metric kinds
// ---------------------------------------------------------------------------

/// Every cached metric, used to key the computation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    /// Reserve energy threshold.
    MinStoredEnergy,
    /// Storage and terminal presence.
    StoringStructures,
    /// Combat-response capacity.
    MaxCombatRequests,
    /// Ramparts due for repair.
    RampartRepairTargets,
    /// Ramparts on the defensive perimeter.
    DefensiveRamparts,
    /// Defense escalation hit target.
    MinRampartHits,
    /// Peak upgrade throughput.
    MaxUpgradeStrength,
    /// Structure feeding the controller.
    UpgradeStructure,
    /// Structure kinds ordered for construction.
    BuildPriority,
}

/// The structure that feeds controller upgrading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStructure {
    /// A container next to the controller.
    Container(ContainerSite),
    /// A link next to the controller.
    Link(LinkSite),
}

// ---------------------------------------------------------------------------
// Metrics cache
// ---------------------------------------------------------------------------

/// Per-commune derived metrics cache.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    tick_epoch: u64,
    slow_epoch: u64,

    min_stored_energy: Slot<i64>,
    storing_structures: Slot<Vec<StoringStructure>>,
    max_combat_requests: Slot<f64>,
    rampart_repair_targets: Slot<Vec<StructureId>>,
    defensive_ramparts: Slot<Vec<StructureId>>,

    min_rampart_hits: Slot<u64>,
    max_upgrade_strength: Slot<f64>,
    upgrade_structure: Slot<Option<UpgradeStructure>>,

    build_priority: Option<Vec<StructureKind>>,

    computations: BTreeMap<MetricKind, u32>,
}

fn record(computations: &mut BTreeMap<MetricKind, u32>, kind: MetricKind) {
    let count = computations.entry(kind).or_insert(0);
    *count = count.saturating_add(1);
}

impl Metrics {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tick. Tick-scoped metrics go stale; slow metrics go
    /// stale only when `refresh_slow` is set.
    pub const fn begin_tick(&mut self, tick: u64, refresh_slow: bool) {
        self.tick_epoch = tick;
        if refresh_slow {
            self.slow_epoch = self.slow_epoch.saturating_add(1);
        }
    }

    /// How many times `kind` has been computed over the cache's life.
    pub fn computations(&self, kind: MetricKind) -> u32 {
        self.computations.get(&kind).copied().unwrap_or(0)
    }

    // --- Tick-scoped ---

    /// Energy the zone keeps for emergencies. May be negative at low
    /// control levels.
    pub fn min_stored_energy(&mut self, zone: &ZoneState) -> i64 {
        let computations = &mut self.computations;
        *self
            .min_stored_energy
            .get_or_insert_with(self.tick_epoch, || {
                record(computations, MetricKind::MinStoredEnergy);
                compute_min_stored_energy(zone)
            })
    }

    /// Storing structures present in the zone, storage first.
    pub fn storing_structures(&mut self, zone: &ZoneState) -> &[StoringStructure] {
        let computations = &mut self.computations;
        self.storing_structures
            .get_or_insert_with(self.tick_epoch, || {
                record(computations, MetricKind::StoringStructures);
                let mut structures = Vec::with_capacity(2);
                if zone.storage.is_some() {
                    structures.push(StoringStructure::Storage);
                }
                if zone.terminal.is_some() {
                    structures.push(StoringStructure::Terminal);
                }
                structures
            })
            .as_slice()
    }

    /// How many combat requests the zone can afford to answer.
    pub fn max_combat_requests(&mut self, zone: &ZoneState) -> f64 {
        let computations = &mut self.computations;
        *self
            .max_combat_requests
            .get_or_insert_with(self.tick_epoch, || {
                record(computations, MetricKind::MaxCombatRequests);
                let energy = f64::from(zone.stored_amount(commune_types::Resource::Energy));
                let level = f64::from(zone.controller.level);
                energy / level.mul_add(3000.0, 10_000.0)
            })
    }

    /// Ramparts the repairers should keep topped up.
    ///
    /// # Errors
    ///
    /// [`EconomyError::ConfigurationMissing`] when the zone has no rampart
    /// plans.
    pub fn rampart_repair_targets(&mut self, zone: &ZoneState) -> Result<&[StructureId], EconomyError> {
        let computations = &mut self.computations;
        self.rampart_repair_targets
            .get_or_try_insert_with(self.tick_epoch, || {
                record(computations, MetricKind::RampartRepairTargets);
                compute_rampart_repair_targets(zone)
            })
            .map(Vec::as_slice)
    }

    /// Ramparts standing on the defensive perimeter.
    ///
    /// # Errors
    ///
    /// [`EconomyError::ConfigurationMissing`] when the zone has no
    /// perimeter plan.
    pub fn defensive_ramparts(&mut self, zone: &ZoneState) -> Result<&[StructureId], EconomyError> {
        let computations = &mut self.computations;
        self.defensive_ramparts
            .get_or_try_insert_with(self.tick_epoch, || {
                record(computations, MetricKind::DefensiveRamparts);
                let perimeter = zone.defense.perimeter.as_ref().ok_or_else(|| {
                    EconomyError::ConfigurationMissing {
                        zone: zone.name.clone(),
                        plan: "defensive perimeter",
                    }
                })?;
                let perimeter: BTreeSet<Coord> = perimeter.iter().copied().collect();
                Ok(zone
                    .defense
                    .ramparts
                    .iter()
                    .filter(|rampart| perimeter.contains(&rampart.coord))
                    .map(|rampart| rampart.id)
                    .collect())
            })
            .map(Vec::as_slice)
    }

    // --- Slow ---

    /// Hit points ramparts should be repaired to before escalating.
    pub fn min_rampart_hits(&mut self, zone: &ZoneState) -> u64 {
        let computations = &mut self.computations;
        *self.min_rampart_hits.get_or_insert_with(self.slow_epoch, || {
            record(computations, MetricKind::MinRampartHits);
            compute_min_rampart_hits(zone.controller.level, zone.threat)
        })
    }

    /// The structure that feeds controller upgrading, if any.
    pub fn upgrade_structure(&mut self, zone: &ZoneState) -> Option<UpgradeStructure> {
        let computations = &mut self.computations;
        *self.upgrade_structure.get_or_insert_with(self.slow_epoch, || {
            record(computations, MetricKind::UpgradeStructure);
            compute_upgrade_structure(zone)
        })
    }

    /// Energy per tick the upgrade logistics can deliver to the controller.
    pub fn max_upgrade_strength(&mut self, zone: &ZoneState) -> f64 {
        if let Some(strength) = self.max_upgrade_strength.get(self.slow_epoch) {
            return *strength;
        }
        let structure = self.upgrade_structure(zone);
        let computations = &mut self.computations;
        *self.max_upgrade_strength.get_or_insert_with(self.slow_epoch, || {
            record(computations, MetricKind::MaxUpgradeStrength);
            compute_max_upgrade_strength(zone, structure)
        })
    }

    // --- Commune lifetime ---

    /// Structure kinds in the order builders should work on them.
    pub fn build_priority(&mut self, zone: &ZoneState) -> &[StructureKind] {
        let computations = &mut self.computations;
        self.build_priority
            .get_or_insert_with(|| {
                record(computations, MetricKind::BuildPriority);
                build_priority_for(zone.fast_filler_containers > 0)
            })
            .as_slice()
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// `floor((level * 6000)^1.06 + threat * 20 - (progress / total * 20)^3.35)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn compute_min_stored_energy(zone: &ZoneState) -> i64 {
    let level = f64::from(zone.controller.level);
    let mut reserve = (level * 6000.0).powf(1.06) + f64::from(zone.threat) * 20.0;

    if let Some(total) = zone.controller.progress_total.filter(|total| *total > 0) {
        let progress = zone.controller.progress.min(total) as f64;
        reserve -= (progress / total as f64 * 20.0).powf(3.35);
    }

    reserve.floor() as i64
}

/// Defense escalation threshold, falling back to the default when the
/// formula yields zero or nothing.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn compute_min_rampart_hits(level: u8, threat: u32) -> u64 {
    let Some(cap) = rampart_hits_max(level) else {
        return DEFAULT_MIN_RAMPART_HITS;
    };
    let lvl = f64::from(level);
    let raw = ((lvl - 3.0) * 50.0).powf(2.5) + f64::from(threat) * 5.0 * lvl.powi(2);
    let raw = raw.floor();
    if raw.is_nan() {
        return DEFAULT_MIN_RAMPART_HITS;
    }
    let hits = raw.min(cap as f64 * 0.9);
    if hits < 1.0 {
        return DEFAULT_MIN_RAMPART_HITS;
    }
    hits as u64
}

fn compute_rampart_repair_targets(zone: &ZoneState) -> Result<Vec<StructureId>, EconomyError> {
    let plans = zone
        .defense
        .rampart_plans
        .as_ref()
        .ok_or_else(|| EconomyError::ConfigurationMissing {
            zone: zone.name.clone(),
            plan: "rampart",
        })?;
    let plans: BTreeMap<Coord, _> = plans.iter().map(|plan| (plan.coord, plan)).collect();

    let mut targets = Vec::new();
    for rampart in &zone.defense.ramparts {
        let Some(plan) = plans.get(&rampart.coord) else {
            continue;
        };
        if plan.min_level > zone.controller.level {
            continue;
        }
        if plan.covers_structure && !zone.defense.protected_coords.contains(&rampart.coord) {
            continue;
        }
        if plan.build_for_nuke && !zone.defense.nuke_targets.contains(&rampart.coord) {
            continue;
        }
        if !plan.build_for_nuke
            && plan.build_for_threat
            && zone.threat < THREAT_RAMPARTS_THRESHOLD
        {
            continue;
        }
        targets.push(rampart.id);
    }
    Ok(targets)
}

fn compute_upgrade_structure(zone: &ZoneState) -> Option<UpgradeStructure> {
    let level = zone.controller.level;
    if level < 2 {
        return None;
    }
    if level < 5 {
        return zone.upgrade.controller_container.map(UpgradeStructure::Container);
    }
    let controller_link = zone.upgrade.controller_link.filter(|link| link.actionable)?;
    zone.upgrade.hub_link.filter(|link| link.actionable)?;
    Some(UpgradeStructure::Link(controller_link))
}

fn compute_max_upgrade_strength(zone: &ZoneState, structure: Option<UpgradeStructure>) -> f64 {
    match structure {
        None => NUDE_UPGRADE_STRENGTH,
        Some(UpgradeStructure::Container(container)) => {
            f64::from(container.capacity) / (4.0 + f64::from(zone.upgrade.upgrade_path_length))
        }
        Some(UpgradeStructure::Link(controller_link)) => {
            let mut strength = 0.0;
            if let Some(hub) = zone.upgrade.hub_link.filter(|link| link.actionable) {
                let range = hub.coord.range_to(controller_link.coord);
                strength += link_throughput(range, LINK_CAPACITY) * LINK_UPGRADE_SHARE;
            }
            for (link, income) in zone
                .upgrade
                .source_links
                .iter()
                .zip(zone.upgrade.estimated_source_income.iter())
            {
                if !link.actionable {
                    continue;
                }
                let range = link.coord.range_to(controller_link.coord);
                strength += link_throughput(range, *income) * LINK_UPGRADE_SHARE;
            }
            strength
        }
    }
}

/// Energy per tick a link `range` tiles away can deliver, given `income`.
pub fn link_throughput(range: u8, income: u32) -> f64 {
    let per_trip = f64::from(LINK_CAPACITY) / f64::from(range.max(1));
    per_trip.min(f64::from(income)) * (1.0 - LINK_LOSS_RATIO)
}

fn build_priority_for(has_fast_filler: bool) -> Vec<StructureKind> {
    let (first, second) = if has_fast_filler {
        (StructureKind::Extension, StructureKind::Container)
    } else {
        (StructureKind::Container, StructureKind::Extension)
    };
    vec![
        StructureKind::Rampart,
        StructureKind::Wall,
        StructureKind::Spawn,
        first,
        second,
        StructureKind::Road,
        StructureKind::Storage,
        StructureKind::Tower,
        StructureKind::Terminal,
        StructureKind::Link,
        StructureKind::Extractor,
        StructureKind::Lab,
        StructureKind::Factory,
        StructureKind::PowerSpawn,
        StructureKind::Nuker,
        StructureKind::Observer,
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]
mod tests {
    use commune_types::{ControllerState, Rampart, RampartPlan, Resource};

    use super::*;

    fn zone(level: u8) -> ZoneState {
        ZoneState::new("W1N1", level)
    }

    fn rampart(x: u8, y: u8) -> Rampart {
        Rampart {
            id: StructureId::new(),
            coord: Coord::new(x, y),
            hits: 0,
        }
    }

    fn plan(x: u8, y: u8) -> RampartPlan {
        RampartPlan {
            coord: Coord::new(x, y),
            min_level: 0,
            covers_structure: false,
            build_for_nuke: false,
            build_for_threat: false,
        }
    }

    #[test]
    fn reserve_is_computed_once_per_tick() {
        let zone = zone(6);
        let mut metrics = Metrics::new();
        metrics.begin_tick(1, false);

        let first = metrics.min_stored_energy(&zone);
        let second = metrics.min_stored_energy(&zone);
        assert_eq!(first, second);
        assert_eq!(metrics.computations(MetricKind::MinStoredEnergy), 1);

        metrics.begin_tick(2, false);
        metrics.min_stored_energy(&zone);
        assert_eq!(metrics.computations(MetricKind::MinStoredEnergy), 2);
    }

    #[test]
    fn reserve_formula() {
        let mut zone = zone(4);
        zone.threat = 100;
        // (24000)^1.06 + 2000
        let expected = (24_000.0_f64.powf(1.06) + 2000.0).floor();
        let mut metrics = Metrics::new();
        assert_eq!(metrics.min_stored_energy(&zone) as f64, expected);
    }

    #[test]
    fn reserve_drops_as_the_controller_nears_its_next_level() {
        let mut near = zone(4);
        near.controller = ControllerState {
            level: 4,
            progress: 900,
            progress_total: Some(1000),
        };
        let far = zone(4);
        let near_reserve = Metrics::new().min_stored_energy(&near);
        let far_reserve = Metrics::new().min_stored_energy(&far);
        assert!(near_reserve < far_reserve);
    }

    #[test]
    fn combat_capacity_scales_with_stored_energy() {
        let mut zone = zone(5);
        zone.stored.insert(Resource::Energy, 50_000);
        let mut metrics = Metrics::new();
        assert_eq!(metrics.max_combat_requests(&zone), 2.0);
    }

    #[test]
    fn slow_metrics_survive_ticks_until_refresh() {
        let zone = zone(6);
        let mut metrics = Metrics::new();
        metrics.begin_tick(1, false);
        metrics.min_rampart_hits(&zone);
        metrics.begin_tick(2, false);
        metrics.min_rampart_hits(&zone);
        assert_eq!(metrics.computations(MetricKind::MinRampartHits), 1);

        metrics.begin_tick(3, true);
        metrics.min_rampart_hits(&zone);
        assert_eq!(metrics.computations(MetricKind::MinRampartHits), 2);
    }

    #[test]
    fn rampart_hits_default_below_level_three() {
        assert_eq!(compute_min_rampart_hits(1, 0), DEFAULT_MIN_RAMPART_HITS);
        assert_eq!(compute_min_rampart_hits(2, 0), DEFAULT_MIN_RAMPART_HITS);
        assert_eq!(compute_min_rampart_hits(3, 0), DEFAULT_MIN_RAMPART_HITS);
    }

    #[test]
    fn rampart_hits_are_capped() {
        // 250^2.5 is roughly 988k, well under 0.9 * 10M.
        let hits = compute_min_rampart_hits(8, 0);
        assert_eq!(hits, 988_211);
        // Enormous threat pins the value to 90% of the level-5 cap.
        assert_eq!(compute_min_rampart_hits(5, u32::MAX), 9_000_000);
    }

    #[test]
    fn missing_rampart_plans_is_an_error() {
        let zone = zone(6);
        let mut metrics = Metrics::new();
        let result = metrics.rampart_repair_targets(&zone);
        assert!(matches!(
            result,
            Err(EconomyError::ConfigurationMissing { plan: "rampart", .. })
        ));
    }

    #[test]
    fn missing_perimeter_is_an_error() {
        let zone = zone(6);
        let mut metrics = Metrics::new();
        assert!(metrics.defensive_ramparts(&zone).is_err());
    }

    #[test]
    fn repair_targets_follow_plans() {
        let mut zone = zone(6);
        let plain = rampart(1, 1);
        let nuke = rampart(2, 2);
        let threat = rampart(3, 3);
        let covering = rampart(4, 4);
        let too_early = rampart(5, 5);
        let unplanned = rampart(6, 6);

        let mut nuke_plan = plan(2, 2);
        nuke_plan.build_for_nuke = true;
        let mut threat_plan = plan(3, 3);
        threat_plan.build_for_threat = true;
        let mut covering_plan = plan(4, 4);
        covering_plan.covers_structure = true;
        let mut early_plan = plan(5, 5);
        early_plan.min_level = 7;

        zone.defense.ramparts = vec![
            plain.clone(),
            nuke.clone(),
            threat.clone(),
            covering,
            too_early,
            unplanned,
        ];
        zone.defense.rampart_plans = Some(vec![
            plan(1, 1),
            nuke_plan,
            threat_plan,
            covering_plan,
            early_plan,
        ]);
        zone.defense.nuke_targets.insert(Coord::new(2, 2));

        let mut metrics = Metrics::new();
        let targets = metrics.rampart_repair_targets(&zone).unwrap().to_vec();
        assert_eq!(targets, vec![plain.id, nuke.id]);

        zone.threat = THREAT_RAMPARTS_THRESHOLD;
        metrics.begin_tick(1, false);
        let targets = metrics.rampart_repair_targets(&zone).unwrap().to_vec();
        assert_eq!(targets, vec![plain.id, nuke.id, threat.id]);
    }

    #[test]
    fn defensive_ramparts_are_on_the_perimeter() {
        let mut zone = zone(6);
        let inside = rampart(10, 10);
        let edge = rampart(20, 20);
        zone.defense.ramparts = vec![inside, edge.clone()];
        zone.defense.perimeter = Some(vec![Coord::new(20, 20), Coord::new(21, 20)]);
        let mut metrics = Metrics::new();
        assert_eq!(metrics.defensive_ramparts(&zone).unwrap(), &[edge.id]);
    }

    #[test]
    fn upgrade_strength_without_structure() {
        let zone = zone(1);
        let mut metrics = Metrics::new();
        assert_eq!(metrics.upgrade_structure(&zone), None);
        assert_eq!(metrics.max_upgrade_strength(&zone), NUDE_UPGRADE_STRENGTH);
    }

    #[test]
    fn upgrade_strength_from_container() {
        let mut zone = zone(3);
        zone.upgrade.controller_container = Some(ContainerSite {
            coord: Coord::new(5, 5),
            capacity: 2000,
        });
        zone.upgrade.upgrade_path_length = 16;
        let mut metrics = Metrics::new();
        assert_eq!(metrics.max_upgrade_strength(&zone), 100.0);
        assert_eq!(metrics.computations(MetricKind::UpgradeStructure), 1);
    }

    #[test]
    fn upgrade_strength_from_links() {
        let mut zone = zone(6);
        zone.upgrade.controller_link = Some(LinkSite {
            coord: Coord::new(10, 10),
            actionable: true,
        });
        zone.upgrade.hub_link = Some(LinkSite {
            coord: Coord::new(10, 20),
            actionable: true,
        });
        zone.upgrade.source_links = vec![
            LinkSite {
                coord: Coord::new(30, 10),
                actionable: true,
            },
            LinkSite {
                coord: Coord::new(0, 0),
                actionable: false,
            },
        ];
        zone.upgrade.estimated_source_income = vec![10, 10];

        let mut metrics = Metrics::new();
        let strength = metrics.max_upgrade_strength(&zone);
        // hub: min(800/10, 800) * 0.97 * 0.7; source: min(800/20, 10) * 0.97 * 0.7
        let expected = 80.0 * 0.97 * 0.7 + 10.0 * 0.97 * 0.7;
        assert!((strength - expected).abs() < 1e-9);
    }

    #[test]
    fn link_upgrading_needs_an_actionable_hub() {
        let mut zone = zone(6);
        zone.upgrade.controller_link = Some(LinkSite {
            coord: Coord::new(10, 10),
            actionable: true,
        });
        let mut metrics = Metrics::new();
        assert_eq!(metrics.upgrade_structure(&zone), None);
    }

    #[test]
    fn build_priority_is_computed_once() {
        let mut zone = zone(3);
        let mut metrics = Metrics::new();
        assert_eq!(metrics.build_priority(&zone).get(3), Some(&StructureKind::Container));

        zone.fast_filler_containers = 2;
        metrics.begin_tick(5, true);
        assert_eq!(metrics.build_priority(&zone).get(3), Some(&StructureKind::Container));
        assert_eq!(metrics.computations(MetricKind::BuildPriority), 1);

        let mut fresh = Metrics::new();
        assert_eq!(fresh.build_priority(&zone).get(3), Some(&StructureKind::Extension));
    }

    #[test]
    fn storing_structures_lists_storage_first() {
        let mut zone = zone(6);
        zone.terminal = Some(commune_types::TerminalState::default());
        zone.storage = Some(commune_types::StorageState { capacity: 1_000_000 });
        let mut metrics = Metrics::new();
        assert_eq!(
            metrics.storing_structures(&zone),
            &[StoringStructure::Storage, StoringStructure::Terminal]
        );
    }
}
