//! The defense brief handed to the defense subsystem each tick.

use commune_types::StructureId;
use serde::{Deserialize, Serialize};

use crate::commune::Commune;
use crate::error::EconomyError;

/// Thresholds and rampart lists the defense subsystem acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseBrief {
    /// Hits ramparts are repaired to before defense escalates.
    pub escalation_threshold: u64,
    /// Threat at which threat-only ramparts are maintained.
    pub threat_ramparts_threshold: u32,
    /// Ramparts on the defensive perimeter.
    pub defensive_ramparts: Vec<StructureId>,
    /// Ramparts due for repair.
    pub repair_targets: Vec<StructureId>,
    /// How many combat requests the zone can answer.
    pub max_combat_requests: f64,
}

impl DefenseBrief {
    /// Assemble the brief for `commune`.
    ///
    /// # Errors
    ///
    /// [`EconomyError::ConfigurationMissing`] when the perimeter or rampart
    /// plans are absent.
    pub fn for_commune(commune: &mut Commune) -> Result<Self, EconomyError> {
        let defensive_ramparts = commune.defensive_ramparts()?.to_vec();
        let repair_targets = commune.rampart_repair_targets()?.to_vec();
        Ok(Self {
            escalation_threshold: commune.min_rampart_hits(),
            threat_ramparts_threshold: commune.min_threat_ramparts_threshold(),
            defensive_ramparts,
            repair_targets,
            max_combat_requests: commune.max_combat_requests(),
        })
    }
}
