//! Tick cycle: the three passes that drive every commune once per tick.
//!
//! 1. **Update** -- advance the clock, read the ally segment, and refresh
//!    each commune from its zone snapshot. Abandoned and lost zones are torn
//!    down and their requests purged.
//!
//! 2. **Pre-tick** -- every commune with an actionable terminal posts its
//!    shortfalls to the shared request registry, so every responder sees
//!    every request in the same tick.
//!
//! 3. **Run** -- for each commune whose planning is complete, publish the
//!    defense brief, then run the terminal stage chain. The platform's CPU
//!    signal is checked between zones and stops the pass cleanly.

use std::collections::{BTreeMap, BTreeSet};

use commune_economy::registry::create_terminal_requests;
use commune_economy::terminal::run_terminal;
use commune_economy::{
    AlliedChannel, Commune, DefenseBrief, DefenseSubsystem, RefreshPolicy, RequestRegistry,
    StageResult, TerminalContext, TradeSettings, WorldPlatform,
};
use commune_types::ZoneName;
use tracing::{debug, info, warn};

use crate::clock::TickClock;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },
}

/// What happened to one zone during the run pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneDecision {
    /// The terminal stage chain ran.
    Terminal(StageResult),
    /// Base planning has not finished; the zone was not run.
    PlanningIncomplete,
    /// A plan the zone needs was missing; only this zone was skipped.
    Halted {
        /// Rendered error.
        reason: String,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Outcome per zone that reached the run pass.
    pub decisions: BTreeMap<ZoneName, ZoneDecision>,
    /// Zones torn down this tick.
    pub abandoned: Vec<ZoneName>,
    /// Internal requests posted in the pre-tick pass.
    pub requests_posted: usize,
    /// Whether the run pass stopped early for lack of CPU.
    pub interrupted: bool,
}

impl TickSummary {
    /// Number of zones whose terminal acted.
    pub fn actions(&self) -> usize {
        self.decisions
            .values()
            .filter(|decision| {
                matches!(decision, ZoneDecision::Terminal(result) if result.action().is_some())
            })
            .count()
    }
}

/// Mutable scheduler state carried between ticks.
///
/// Owns every commune and the shared registries. Nothing here is global:
/// the tick runner receives it by `&mut`.
#[derive(Debug)]
pub struct SchedulerState {
    /// Tick clock.
    pub clock: TickClock,
    /// Live communes by zone.
    pub communes: BTreeMap<ZoneName, Commune>,
    /// Shared internal requests.
    pub registry: RequestRegistry,
    /// This tick's allied requests.
    pub allies: AlliedChannel,
    /// Trade switches and limits.
    pub settings: TradeSettings,
    refresh: Box<dyn RefreshPolicy>,
}

impl SchedulerState {
    /// Cold start: no communes, empty registries.
    pub fn new(settings: TradeSettings, refresh: Box<dyn RefreshPolicy>) -> Self {
        Self::with_registry(TickClock::new(), RequestRegistry::new(), settings, refresh)
    }

    /// Resume with a restored clock and registry. Communes are rebuilt
    /// from the next tick's snapshots with cold metric caches.
    pub fn with_registry(
        clock: TickClock,
        registry: RequestRegistry,
        settings: TradeSettings,
        refresh: Box<dyn RefreshPolicy>,
    ) -> Self {
        Self {
            clock,
            communes: BTreeMap::new(),
            registry,
            allies: AlliedChannel::new(),
            settings,
            refresh,
        }
    }
}

/// Execute one full tick.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter would overflow.
pub fn run_tick(
    state: &mut SchedulerState,
    platform: &mut dyn WorldPlatform,
    defense: &mut dyn DefenseSubsystem,
) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;
    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    read_allies(state, platform, tick);
    update_pass(state, platform, tick, &mut summary);
    pre_tick_pass(state, &mut summary);
    run_pass(state, platform, defense, tick, &mut summary);

    info!(
        tick,
        communes = state.communes.len(),
        requests_posted = summary.requests_posted,
        actions = summary.actions(),
        interrupted = summary.interrupted,
        "Tick complete"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

fn read_allies(state: &mut SchedulerState, platform: &dyn WorldPlatform, tick: u64) {
    state.allies.clear();
    let Some(raw) = platform.read_ally_segment() else {
        debug!(tick, "No ally segment this tick");
        return;
    };
    match state.allies.deliver_json(&raw) {
        Ok(count) => debug!(tick, count, "Ally segment read"),
        Err(err) => warn!(tick, %err, "Ally segment unreadable"),
    }
}

fn update_pass(
    state: &mut SchedulerState,
    platform: &dyn WorldPlatform,
    tick: u64,
    summary: &mut TickSummary,
) {
    let snapshots = platform.zone_snapshots();
    let mut seen: BTreeSet<ZoneName> = BTreeSet::new();

    for snapshot in snapshots {
        let name = snapshot.name.clone();
        if snapshot.abandoned {
            tear_down(state, &name, summary);
            continue;
        }

        match state.communes.get_mut(&name) {
            Some(commune) => commune.update(snapshot, tick, state.refresh.as_mut()),
            None => {
                info!(tick, zone = %name, "Commune created");
                let mut commune = Commune::new(snapshot);
                commune.begin_tick(tick, state.refresh.as_mut());
                state.communes.insert(name.clone(), commune);
            }
        }
        seen.insert(name);
    }

    let lost: Vec<ZoneName> = state
        .communes
        .keys()
        .filter(|name| !seen.contains(name))
        .cloned()
        .collect();
    for name in lost {
        tear_down(state, &name, summary);
    }
}

fn tear_down(state: &mut SchedulerState, name: &ZoneName, summary: &mut TickSummary) {
    let purged = state.registry.purge_zone(name);
    let existed = state.communes.remove(name).is_some();
    if existed || purged > 0 {
        info!(tick = summary.tick, zone = %name, purged, "Commune torn down");
        summary.abandoned.push(name.clone());
    }
}

fn pre_tick_pass(state: &mut SchedulerState, summary: &mut TickSummary) {
    for commune in state.communes.values_mut() {
        let posted = create_terminal_requests(commune, &mut state.registry);
        summary.requests_posted = summary.requests_posted.saturating_add(posted.len());
    }
}

fn run_pass(
    state: &mut SchedulerState,
    platform: &mut dyn WorldPlatform,
    defense: &mut dyn DefenseSubsystem,
    tick: u64,
    summary: &mut TickSummary,
) {
    for (name, commune) in &mut state.communes {
        if platform.cpu_exhausted() {
            warn!(tick, zone = %name, "CPU exhausted, stopping run pass");
            summary.interrupted = true;
            break;
        }

        if !commune.state().planning_completed {
            debug!(tick, zone = %name, "Planning incomplete, skipping");
            summary.decisions.insert(name.clone(), ZoneDecision::PlanningIncomplete);
            continue;
        }

        match DefenseBrief::for_commune(commune) {
            Ok(brief) => defense.receive_brief(name, &brief),
            Err(err) => {
                warn!(tick, zone = %name, %err, "Zone halted");
                summary.decisions.insert(
                    name.clone(),
                    ZoneDecision::Halted {
                        reason: err.to_string(),
                    },
                );
                continue;
            }
        }

        let mut ctx = TerminalContext {
            platform: &mut *platform,
            registry: &mut state.registry,
            allies: &mut state.allies,
            settings: &state.settings,
        };
        let result = run_terminal(commune, &mut ctx);
        match &result {
            StageResult::Matched(action) => debug!(tick, zone = %name, ?action, "Terminal acted"),
            StageResult::NoAction(reason) => debug!(tick, zone = %name, ?reason, "Terminal idle"),
            StageResult::Failed(rejection) => {
                warn!(tick, zone = %name, %rejection, "Terminal intent rejected");
            }
        }
        summary.decisions.insert(name.clone(), ZoneDecision::Terminal(result));
    }
}
