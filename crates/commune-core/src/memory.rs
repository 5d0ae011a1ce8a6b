//! Scheduler state that survives restarts.
//!
//! Only the tick and the internal request registry are persisted. Metric
//! caches are rebuilt cold and the ally segment is read fresh every tick,
//! so a restored scheduler behaves as one that skipped a single tick.

use commune_economy::{RefreshPolicy, RequestRegistry, TradeSettings};
use serde::{Deserialize, Serialize};

use crate::clock::TickClock;
use crate::tick::SchedulerState;

/// Errors that can occur when saving or restoring memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The snapshot could not be encoded or decoded.
    #[error("memory JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Persisted scheduler memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerMemory {
    /// Last tick that completed.
    #[serde(default)]
    pub tick: u64,
    /// Outstanding internal requests.
    #[serde(default)]
    pub registry: RequestRegistry,
}

impl SchedulerMemory {
    /// Snapshot the persistent part of `state`.
    pub fn capture(state: &SchedulerState) -> Self {
        Self {
            tick: state.clock.tick(),
            registry: state.registry.clone(),
        }
    }

    /// Rebuild scheduler state from this memory.
    pub fn restore(self, settings: TradeSettings, refresh: Box<dyn RefreshPolicy>) -> SchedulerState {
        SchedulerState::with_registry(TickClock::from_tick(self.tick), self.registry, settings, refresh)
    }

    /// Encode as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String, MemoryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Json`] if `raw` is not a valid snapshot.
    pub fn from_json(raw: &str) -> Result<Self, MemoryError> {
        Ok(serde_json::from_str(raw)?)
    }
}
