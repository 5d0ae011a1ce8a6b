//! Per-resource stock targets.
//!
//! Each governed resource has a minimum a zone wants on hand and a maximum
//! above which the excess is sold. Resources outside the table are
//! ungoverned: a zone never exports them and never asks for them.
//!
//! | Resource | Eligible when | Min | Max |
//! |----------|---------------|-----|-----|
//! | energy | always | build threshold (>= 0) | half of storing capacity |
//! | power | power spawn built | 1000 | 5000 |
//! | battery | factory built | 0 | 20000 |
//! | ghodium | nuker built | 5000 | 20000 |
//! | H, O, U, L, K, Z, X | at least one lab | 5000 | 20000 |

use commune_types::Resource;

use crate::commune::Commune;

/// Governed resources, in evaluation order.
pub const GOVERNED: [Resource; 11] = [
    Resource::Energy,
    Resource::Power,
    Resource::Battery,
    Resource::Ghodium,
    Resource::Hydrogen,
    Resource::Oxygen,
    Resource::Utrium,
    Resource::Lemergium,
    Resource::Keanium,
    Resource::Zynthium,
    Resource::Catalyst,
];

/// Stock bounds for one resource in one zone, evaluated fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTarget {
    /// Resource the bounds apply to.
    pub resource: Resource,
    /// Stock the zone wants to hold at least.
    pub min: u32,
    /// Stock above which the excess is sold.
    pub max: u32,
    /// Whether the zone currently cares about the resource at all.
    pub eligible: bool,
}

/// Bounds for `resource` in `commune`, or `None` if ungoverned.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn target_for(commune: &mut Commune, resource: Resource) -> Option<ResourceTarget> {
    let facilities = commune.state().facilities.clone();
    let (min, max, eligible) = match resource {
        Resource::Energy => {
            let min = commune
                .stored_energy_build_threshold()
                .floor()
                .clamp(0.0, f64::from(u32::MAX));
            let max = commune.storing_structures_capacity() / 2;
            (min as u32, u32::try_from(max).unwrap_or(u32::MAX), true)
        }
        Resource::Power => (1000, 5000, facilities.power_spawn),
        Resource::Battery => (0, 20_000, facilities.factory),
        Resource::Ghodium => (5000, 20_000, facilities.nuker),
        Resource::Hydrogen
        | Resource::Oxygen
        | Resource::Utrium
        | Resource::Lemergium
        | Resource::Keanium
        | Resource::Zynthium
        | Resource::Catalyst => (5000, 20_000, facilities.labs > 0),
        Resource::Ops | Resource::Metal => return None,
    };
    Some(ResourceTarget {
        resource,
        min,
        max,
        eligible,
    })
}

/// Bounds for every governed resource, in table order.
pub fn targets(commune: &mut Commune) -> Vec<ResourceTarget> {
    GOVERNED
        .into_iter()
        .filter_map(|resource| target_for(commune, resource))
        .collect()
}

/// Stock of `resource` this zone can give away without dipping below its
/// minimum. Ungoverned resources have no surplus.
pub fn surplus(commune: &mut Commune, resource: Resource) -> u32 {
    let stock = commune.stored(resource);
    target_for(commune, resource).map_or(0, |target| stock.saturating_sub(target.min))
}
