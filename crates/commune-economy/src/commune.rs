//! A commune: one owned zone plus its derived metrics cache.

use commune_types::{Resource, StoringStructure, StructureId, StructureKind, ZoneName, ZoneState};

use crate::constants::{THREAT_RAMPARTS_THRESHOLD, controller_downgrade};
use crate::error::EconomyError;
use crate::metrics::{Metrics, UpgradeStructure};
use crate::refresh::RefreshPolicy;

/// An owned zone as the scheduler sees it.
///
/// The zone snapshot is replaced every tick by [`Commune::update`]; the
/// metrics cache lives as long as the commune.
#[derive(Debug, Clone)]
pub struct Commune {
    state: ZoneState,
    metrics: Metrics,
    /// Set once the terminal has committed to an action this tick.
    pub terminal_intended: bool,
}

impl Commune {
    /// Create a commune for a zone seen for the first time.
    pub fn new(state: ZoneState) -> Self {
        Self {
            state,
            metrics: Metrics::new(),
            terminal_intended: false,
        }
    }

    /// Take this tick's snapshot and advance the metric epochs.
    pub fn update(&mut self, state: ZoneState, tick: u64, refresh: &mut dyn RefreshPolicy) {
        self.state = state;
        self.begin_tick(tick, refresh);
    }

    /// Advance the metric epochs for `tick` without replacing the snapshot.
    pub fn begin_tick(&mut self, tick: u64, refresh: &mut dyn RefreshPolicy) {
        self.terminal_intended = false;
        let refresh_slow = refresh.should_refresh(tick);
        self.metrics.begin_tick(tick, refresh_slow);
    }

    /// Zone name.
    pub const fn name(&self) -> &ZoneName {
        &self.state.name
    }

    /// Current snapshot.
    pub const fn state(&self) -> &ZoneState {
        &self.state
    }

    /// Metrics cache, for inspecting computation counters.
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Amount of `resource` held across storage and terminal.
    pub fn stored(&self, resource: Resource) -> u32 {
        self.state.stored_amount(resource)
    }

    // --- Cached ---

    /// Reserve energy threshold.
    pub fn min_stored_energy(&mut self) -> i64 {
        self.metrics.min_stored_energy(&self.state)
    }

    /// Storing structures present.
    pub fn storing_structures(&mut self) -> &[StoringStructure] {
        self.metrics.storing_structures(&self.state)
    }

    /// Combat-response capacity.
    pub fn max_combat_requests(&mut self) -> f64 {
        self.metrics.max_combat_requests(&self.state)
    }

    /// Ramparts due for repair.
    pub fn rampart_repair_targets(&mut self) -> Result<&[StructureId], EconomyError> {
        self.metrics.rampart_repair_targets(&self.state)
    }

    /// Ramparts on the defensive perimeter.
    pub fn defensive_ramparts(&mut self) -> Result<&[StructureId], EconomyError> {
        self.metrics.defensive_ramparts(&self.state)
    }

    /// Defense escalation threshold.
    pub fn min_rampart_hits(&mut self) -> u64 {
        self.metrics.min_rampart_hits(&self.state)
    }

    /// Structure feeding the controller.
    pub fn upgrade_structure(&mut self) -> Option<UpgradeStructure> {
        self.metrics.upgrade_structure(&self.state)
    }

    /// Peak upgrade throughput.
    pub fn max_upgrade_strength(&mut self) -> f64 {
        self.metrics.max_upgrade_strength(&self.state)
    }

    /// Structure kinds in build order.
    pub fn build_priority(&mut self) -> &[StructureKind] {
        self.metrics.build_priority(&self.state)
    }

    // --- Derived on demand ---

    /// Stored energy above which upgraders may draw freely.
    #[allow(clippy::cast_precision_loss)]
    pub fn stored_energy_upgrade_threshold(&mut self) -> f64 {
        self.min_stored_energy() as f64 * 1.3
    }

    /// Stored energy above which builders may draw freely.
    #[allow(clippy::cast_precision_loss)]
    pub fn stored_energy_build_threshold(&mut self) -> f64 {
        self.min_stored_energy() as f64 * 1.2
    }

    /// Combined capacity of storage and terminal.
    pub fn storing_structures_capacity(&self) -> u64 {
        let storage = self.state.storage.as_ref().map_or(0, |storage| storage.capacity);
        let terminal = self.state.terminal.as_ref().map_or(0, |terminal| terminal.capacity);
        u64::from(storage).saturating_add(u64::from(terminal))
    }

    /// Downgrade timer below which upgrading becomes urgent.
    pub fn controller_downgrade_upgrade_threshold(&self) -> u32 {
        controller_downgrade(self.state.controller.level)
            .map_or(0, |ticks| ticks.saturating_mul(3) / 4)
    }

    /// Threat level at which threat-only ramparts are maintained.
    pub const fn min_threat_ramparts_threshold(&self) -> u32 {
        THREAT_RAMPARTS_THRESHOLD
    }

    /// Whether builders should ask haulers for energy instead of fetching
    /// it, which is the case while nothing stores energy.
    pub const fn builders_make_requests(&self) -> bool {
        self.state.fast_filler_containers == 0
            && self.state.storage.is_none()
            && self.state.terminal.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use commune_types::{StorageState, TerminalState};

    use super::*;
    use crate::metrics::MetricKind;
    use crate::refresh::PeriodicRefresh;

    #[test]
    fn update_resets_intent_and_tick_metrics() {
        let mut commune = Commune::new(ZoneState::new("W1N1", 5));
        let mut refresh = PeriodicRefresh::new(100);

        commune.update(ZoneState::new("W1N1", 5), 1, &mut refresh);
        commune.min_stored_energy();
        commune.terminal_intended = true;

        commune.update(ZoneState::new("W1N1", 5), 2, &mut refresh);
        assert!(!commune.terminal_intended);
        commune.min_stored_energy();
        commune.min_stored_energy();
        assert_eq!(commune.metrics().computations(MetricKind::MinStoredEnergy), 2);
    }

    #[test]
    fn begin_tick_keeps_the_snapshot() {
        let mut commune = Commune::new(ZoneState::new("W1N1", 5));
        let mut refresh = PeriodicRefresh::new(100);
        commune.min_stored_energy();
        commune.terminal_intended = true;

        commune.begin_tick(1, &mut refresh);
        assert!(!commune.terminal_intended);
        assert_eq!(commune.state().controller.level, 5);
        commune.min_stored_energy();
        assert_eq!(commune.metrics().computations(MetricKind::MinStoredEnergy), 2);
    }

    #[test]
    fn thresholds_scale_the_reserve() {
        let mut commune = Commune::new(ZoneState::new("W1N1", 4));
        let reserve = commune.min_stored_energy();
        assert!(reserve > 0);
        assert!(commune.stored_energy_build_threshold() < commune.stored_energy_upgrade_threshold());
    }

    #[test]
    fn downgrade_threshold_is_three_quarters() {
        let commune = Commune::new(ZoneState::new("W1N1", 8));
        assert_eq!(commune.controller_downgrade_upgrade_threshold(), 150_000);
        let unclaimed = Commune::new(ZoneState::new("W1N1", 0));
        assert_eq!(unclaimed.controller_downgrade_upgrade_threshold(), 0);
    }

    #[test]
    fn builders_request_only_without_storage() {
        let mut state = ZoneState::new("W1N1", 2);
        assert!(Commune::new(state.clone()).builders_make_requests());

        state.storage = Some(StorageState { capacity: 1_000_000 });
        state.terminal = Some(TerminalState {
            capacity: 300_000,
            ..TerminalState::default()
        });
        let commune = Commune::new(state);
        assert!(!commune.builders_make_requests());
        assert_eq!(commune.storing_structures_capacity(), 1_300_000);
    }
}
