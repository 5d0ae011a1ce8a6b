//! Enumeration types for the commune economy.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A fungible resource a zone can store, transfer, and trade.
///
/// Serialized with the world's short resource codes (`"energy"`, `"H"`,
/// `"X"`, ...) so allied segments and scenario files can use them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// The universal currency of production, spawning, and transfer fees.
    #[serde(rename = "energy")]
    Energy,
    /// Processed power for the power spawn.
    #[serde(rename = "power")]
    Power,
    /// Compressed energy produced by a factory.
    #[serde(rename = "battery")]
    Battery,
    /// Ghodium, the nuker ammunition.
    #[serde(rename = "G")]
    Ghodium,
    /// Base mineral hydrogen.
    #[serde(rename = "H")]
    Hydrogen,
    /// Base mineral oxygen.
    #[serde(rename = "O")]
    Oxygen,
    /// Base mineral utrium.
    #[serde(rename = "U")]
    Utrium,
    /// Base mineral lemergium.
    #[serde(rename = "L")]
    Lemergium,
    /// Base mineral keanium.
    #[serde(rename = "K")]
    Keanium,
    /// Base mineral zynthium.
    #[serde(rename = "Z")]
    Zynthium,
    /// Catalyst.
    #[serde(rename = "X")]
    Catalyst,
    /// Operations resource for power creeps.
    #[serde(rename = "ops")]
    Ops,
    /// Factory commodity refined from ore.
    #[serde(rename = "metal")]
    Metal,
}

impl Resource {
    /// Every resource, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Energy,
        Self::Power,
        Self::Battery,
        Self::Ghodium,
        Self::Hydrogen,
        Self::Oxygen,
        Self::Utrium,
        Self::Lemergium,
        Self::Keanium,
        Self::Zynthium,
        Self::Catalyst,
        Self::Ops,
        Self::Metal,
    ];

    /// The world's short code for this resource.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Power => "power",
            Self::Battery => "battery",
            Self::Ghodium => "G",
            Self::Hydrogen => "H",
            Self::Oxygen => "O",
            Self::Utrium => "U",
            Self::Lemergium => "L",
            Self::Keanium => "K",
            Self::Zynthium => "Z",
            Self::Catalyst => "X",
            Self::Ops => "ops",
            Self::Metal => "metal",
        }
    }

    /// Look up a resource by its short code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|resource| resource.code() == code)
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Direction of a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    /// The owner wants to acquire the resource.
    Buy,
    /// The owner wants to dispose of the resource.
    Sell,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Channel a transfer request arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOrigin {
    /// Posted by one of our own zones into the shared registry.
    Internal,
    /// Delivered by an allied player through the communication segment.
    Allied,
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// A buildable structure kind, used for build-priority ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Defensive rampart.
    Rampart,
    /// Constructed wall.
    Wall,
    /// Spawn.
    Spawn,
    /// Container.
    Container,
    /// Extension.
    Extension,
    /// Road.
    Road,
    /// Storage.
    Storage,
    /// Tower.
    Tower,
    /// Terminal.
    Terminal,
    /// Link.
    Link,
    /// Mineral extractor.
    Extractor,
    /// Lab.
    Lab,
    /// Factory.
    Factory,
    /// Power spawn.
    PowerSpawn,
    /// Nuker.
    Nuker,
    /// Observer.
    Observer,
}

/// A structure that holds the zone's stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoringStructure {
    /// The zone's storage.
    Storage,
    /// The zone's terminal.
    Terminal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_codes_roundtrip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_code(resource.code()), Some(resource));
        }
        assert_eq!(Resource::from_code("unobtainium"), None);
    }

    #[test]
    fn resource_serializes_as_code() {
        let json = serde_json::to_string(&Resource::Ghodium).ok();
        assert_eq!(json.as_deref(), Some("\"G\""));
        let parsed: Option<Resource> = serde_json::from_str("\"energy\"").ok();
        assert_eq!(parsed, Some(Resource::Energy));
    }
}
