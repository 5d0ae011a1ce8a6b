//! Engine binary for the commune scheduler.
//!
//! Runs the scheduler against the in-memory world for a fixed number of
//! ticks and logs what every terminal did.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `COMMUNE_CONFIG` (default `commune-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the world from `COMMUNE_SCENARIO` (default `commune-scenario.yaml`)
//! 4. Restore scheduler memory from `COMMUNE_MEMORY`, if set and present
//! 5. Run `simulation.max_ticks` ticks
//! 6. Save scheduler memory to `COMMUNE_MEMORY`, if set

mod error;

use std::path::{Path, PathBuf};

use commune_core::config::SchedulerConfig;
use commune_core::memory::SchedulerMemory;
use commune_core::sim::{RecordingDefense, Scenario, SimulatedWorld};
use commune_core::tick::{self, SchedulerState, ZoneDecision};
use commune_economy::{StageResult, WorldPlatform};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or a tick fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config);
    info!(
        max_ticks = config.simulation.max_ticks,
        seed = config.simulation.seed,
        market_usage = config.settings.market_usage,
        ally_communication = config.settings.ally_communication,
        "Configuration loaded"
    );

    // 3. Load the world.
    let scenario_path = env_path("COMMUNE_SCENARIO", "commune-scenario.yaml");
    let scenario = if scenario_path.exists() {
        Scenario::from_file(&scenario_path)?
    } else {
        warn!(path = %scenario_path.display(), "Scenario not found, starting an empty world");
        Scenario::default()
    };
    info!(zones = scenario.zones.len(), "Scenario loaded");
    let mut world = SimulatedWorld::from_scenario(scenario);
    let mut defense = RecordingDefense::default();

    // 4. Restore or cold-start the scheduler.
    let memory_path = std::env::var_os("COMMUNE_MEMORY").map(PathBuf::from);
    let mut state = restore_state(&config, memory_path.as_deref())?;

    // 5. Run.
    let mut actions: usize = 0;
    for _ in 0..config.simulation.max_ticks {
        let summary = tick::run_tick(&mut state, &mut world, &mut defense)?;
        for (zone, decision) in &summary.decisions {
            match decision {
                ZoneDecision::Terminal(StageResult::Matched(action)) => {
                    info!(tick = summary.tick, zone = %zone, ?action, "Terminal action");
                }
                ZoneDecision::Halted { reason } => {
                    warn!(tick = summary.tick, zone = %zone, reason = %reason, "Zone halted");
                }
                ZoneDecision::Terminal(_) | ZoneDecision::PlanningIncomplete => {}
            }
        }
        actions = actions.saturating_add(summary.actions());
        world.advance_tick();
    }

    // 6. Persist.
    if let Some(path) = memory_path.as_deref() {
        save_memory(&state, path)?;
    }

    info!(
        final_tick = state.clock.tick(),
        actions,
        outstanding_requests = state.registry.len(),
        credits = %world.credits(),
        "commune-engine shutdown complete"
    );
    Ok(())
}

/// Load the scheduler configuration, falling back to defaults when the
/// file does not exist.
fn load_config() -> Result<SchedulerConfig, EngineError> {
    let path = env_path("COMMUNE_CONFIG", "commune-config.yaml");
    if path.exists() {
        Ok(SchedulerConfig::from_file(&path)?)
    } else {
        Ok(SchedulerConfig::default())
    }
}

fn init_logging(config: &SchedulerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var).map_or_else(|| PathBuf::from(default), PathBuf::from)
}

fn restore_state(config: &SchedulerConfig, path: Option<&Path>) -> Result<SchedulerState, EngineError> {
    let refresh = config.build_refresh();
    let Some(path) = path.filter(|path| path.exists()) else {
        info!("Cold start");
        return Ok(SchedulerState::new(config.settings.clone(), refresh));
    };
    let raw = std::fs::read_to_string(path).map_err(|source| EngineError::MemoryFile {
        path: path.display().to_string(),
        source,
    })?;
    let memory = SchedulerMemory::from_json(&raw)?;
    info!(
        tick = memory.tick,
        requests = memory.registry.len(),
        "Scheduler memory restored"
    );
    Ok(memory.restore(config.settings.clone(), refresh))
}

fn save_memory(state: &SchedulerState, path: &Path) -> Result<(), EngineError> {
    let raw = SchedulerMemory::capture(state).to_json()?;
    std::fs::write(path, raw).map_err(|source| EngineError::MemoryFile {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "Scheduler memory saved");
    Ok(())
}
