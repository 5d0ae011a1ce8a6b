//! Zone identity and the per-tick zone snapshot.
//!
//! A [`ZoneState`] is the read-only view of one commune that the world
//! platform hands the scheduler at the start of every tick. The scheduler
//! never mutates it; every world change goes through the platform.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::Resource;
use crate::ids::StructureId;

// ---------------------------------------------------------------------------
// Zone names and world coordinates
// ---------------------------------------------------------------------------

/// Name of a zone on the world grid, e.g. `W5N3` or `E12S40`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneName(pub String);

/// Position of a zone on the world grid.
///
/// West and north halves map to negative coordinates, so `W0N0` is
/// `(-1, -1)` and `E0S0` is `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldCoord {
    /// Horizontal position (west negative).
    pub x: i64,
    /// Vertical position (north negative).
    pub y: i64,
}

impl ZoneName {
    /// Wrap a zone name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the grid position encoded in the name.
    ///
    /// Returns `None` for names that are not of the `[WE]<n>[NS]<n>` form.
    pub fn world_coord(&self) -> Option<WorldCoord> {
        let name = self.0.as_str();
        let horizontal = name.chars().next()?;
        let split = name
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == 'N' || *c == 'S')?;
        let x_digits = name.get(1..split.0)?;
        let y_digits = name.get(split.0.checked_add(1)?..)?;

        let x = parse_axis(x_digits, horizontal, 'W', 'E')?;
        let y = parse_axis(y_digits, split.1, 'N', 'S')?;
        Some(WorldCoord { x, y })
    }

    /// Chebyshev distance between two zones on the world grid.
    ///
    /// Returns `None` if either name does not encode a grid position.
    pub fn linear_distance(&self, other: &Self) -> Option<u32> {
        let a = self.world_coord()?;
        let b = other.world_coord()?;
        let dx = a.x.checked_sub(b.x)?.unsigned_abs();
        let dy = a.y.checked_sub(b.y)?.unsigned_abs();
        u32::try_from(dx.max(dy)).ok()
    }
}

/// Parse one axis of a zone name. `negative` is the half-plane that maps
/// below zero (`W` or `N`).
fn parse_axis(digits: &str, half: char, negative: char, positive: char) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    if half == negative {
        value.checked_neg()?.checked_sub(1)
    } else if half == positive {
        Some(value)
    } else {
        None
    }
}

impl core::fmt::Display for ZoneName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for ZoneName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A tile position inside a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Column, 0-49.
    pub x: u8,
    /// Row, 0-49.
    pub y: u8,
}

impl Coord {
    /// Create a tile coordinate.
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Chebyshev range between two tiles.
    pub const fn range_to(self, other: Self) -> u8 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

// ---------------------------------------------------------------------------
// Zone snapshot
// ---------------------------------------------------------------------------

/// Controller state of a zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// Control level, 0-8.
    pub level: u8,
    /// Progress towards the next level.
    #[serde(default)]
    pub progress: u64,
    /// Progress required for the next level; `None` at max level.
    #[serde(default)]
    pub progress_total: Option<u64>,
}

/// The zone's storage structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageState {
    /// Total capacity.
    pub capacity: u32,
}

/// The zone's terminal, its cooldown-gated transfer structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalState {
    /// Total capacity.
    pub capacity: u32,
    /// Current contents.
    #[serde(default)]
    pub store: BTreeMap<Resource, u32>,
    /// Ticks until the terminal can act again.
    #[serde(default)]
    pub cooldown: u32,
    /// Whether the controller level allows the terminal to operate.
    #[serde(default = "default_true")]
    pub actionable: bool,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            capacity: 0,
            store: BTreeMap::new(),
            cooldown: 0,
            actionable: true,
        }
    }
}

impl TerminalState {
    /// Amount of `resource` held in the terminal.
    pub fn amount(&self, resource: Resource) -> u32 {
        self.store.get(&resource).copied().unwrap_or(0)
    }

    /// Total amount held across all resources.
    pub fn used_capacity(&self) -> u32 {
        self.store
            .values()
            .fold(0_u32, |total, amount| total.saturating_add(*amount))
    }

    /// Remaining free capacity.
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.used_capacity())
    }
}

/// Production facilities that gate which resources a zone cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Facilities {
    /// Whether a factory is built.
    #[serde(default)]
    pub factory: bool,
    /// Whether a power spawn is built.
    #[serde(default)]
    pub power_spawn: bool,
    /// Whether a nuker is built.
    #[serde(default)]
    pub nuker: bool,
    /// Number of labs built.
    #[serde(default)]
    pub labs: u8,
}

/// A rampart present in the zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rampart {
    /// Structure id.
    pub id: StructureId,
    /// Tile the rampart sits on.
    pub coord: Coord,
    /// Current hit points.
    #[serde(default)]
    pub hits: u64,
}

/// Planning data for one planned rampart tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RampartPlan {
    /// Tile the plan applies to.
    pub coord: Coord,
    /// Minimum control level at which the rampart is maintained.
    #[serde(default)]
    pub min_level: u8,
    /// The rampart exists to cover a structure underneath it.
    #[serde(default)]
    pub covers_structure: bool,
    /// The rampart only matters when a nuke is inbound on its tile.
    #[serde(default)]
    pub build_for_nuke: bool,
    /// The rampart only matters under elevated threat.
    #[serde(default)]
    pub build_for_threat: bool,
}

/// Defensive layout of a zone: existing ramparts and the precomputed plans
/// that give them meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefenseLayout {
    /// Ramparts currently built.
    #[serde(default)]
    pub ramparts: Vec<Rampart>,
    /// Per-tile rampart plans, absent until base planning has produced them.
    #[serde(default)]
    pub rampart_plans: Option<Vec<RampartPlan>>,
    /// Minimum-cut perimeter tiles, absent until base planning has produced
    /// the stamp anchors.
    #[serde(default)]
    pub perimeter: Option<Vec<Coord>>,
    /// Tiles targeted by inbound nukes.
    #[serde(default)]
    pub nuke_targets: BTreeSet<Coord>,
    /// Tiles holding structures that ramparts should protect.
    #[serde(default)]
    pub protected_coords: BTreeSet<Coord>,
}

/// A link in the zone's upgrade logistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSite {
    /// Tile the link sits on.
    pub coord: Coord,
    /// Whether the controller level allows the link to operate.
    #[serde(default = "default_true")]
    pub actionable: bool,
}

/// A container feeding the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSite {
    /// Tile the container sits on.
    pub coord: Coord,
    /// Container capacity.
    pub capacity: u32,
}

/// Structures and paths that feed controller upgrading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeLayout {
    /// Container next to the controller.
    #[serde(default)]
    pub controller_container: Option<ContainerSite>,
    /// Link next to the controller.
    #[serde(default)]
    pub controller_link: Option<LinkSite>,
    /// Link next to storage that feeds other links.
    #[serde(default)]
    pub hub_link: Option<LinkSite>,
    /// Links next to energy sources, in source order.
    #[serde(default)]
    pub source_links: Vec<LinkSite>,
    /// Estimated energy income per source, in source order.
    #[serde(default)]
    pub estimated_source_income: Vec<u32>,
    /// Number of tiles on the planned upgrade path.
    #[serde(default)]
    pub upgrade_path_length: u32,
}

/// Snapshot of one zone at the start of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    /// Zone name.
    pub name: ZoneName,
    /// Controller state.
    pub controller: ControllerState,
    /// Attack threat scalar maintained by the defense subsystem.
    #[serde(default)]
    pub threat: u32,
    /// Resources held across storing structures (storage and terminal).
    #[serde(default)]
    pub stored: BTreeMap<Resource, u32>,
    /// Storage, if built.
    #[serde(default)]
    pub storage: Option<StorageState>,
    /// Terminal, if built.
    #[serde(default)]
    pub terminal: Option<TerminalState>,
    /// Production facilities.
    #[serde(default)]
    pub facilities: Facilities,
    /// Defensive layout.
    #[serde(default)]
    pub defense: DefenseLayout,
    /// Upgrade logistics.
    #[serde(default)]
    pub upgrade: UpgradeLayout,
    /// Number of fast-filler containers built (0-2).
    #[serde(default)]
    pub fast_filler_containers: u8,
    /// Whether base planning has finished for this zone.
    #[serde(default = "default_true")]
    pub planning_completed: bool,
    /// Whether the zone has been marked for abandonment.
    #[serde(default)]
    pub abandoned: bool,
}

impl ZoneState {
    /// Create a bare zone at the given control level.
    pub fn new(name: impl Into<ZoneName>, level: u8) -> Self {
        Self {
            name: name.into(),
            controller: ControllerState {
                level,
                progress: 0,
                progress_total: None,
            },
            threat: 0,
            stored: BTreeMap::new(),
            storage: None,
            terminal: None,
            facilities: Facilities::default(),
            defense: DefenseLayout::default(),
            upgrade: UpgradeLayout::default(),
            fast_filler_containers: 0,
            planning_completed: true,
            abandoned: false,
        }
    }

    /// Amount of `resource` held across storing structures.
    pub fn stored_amount(&self, resource: Resource) -> u32 {
        self.stored.get(&resource).copied().unwrap_or(0)
    }
}

const fn default_true() -> bool {
    true
}
