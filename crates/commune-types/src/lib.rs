//! Shared type definitions for the commune economy scheduler.
//!
//! This crate is the single source of truth for the types exchanged between
//! the scheduler, the world platform, and persisted memory.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for requests, orders, and structures
//! - [`enums`] -- Resources, order directions, request origins, structure kinds
//! - [`zone`] -- Zone names, grid coordinates, and the per-tick zone snapshot
//! - [`structs`] -- Transfer requests, market orders, and terminal actions

pub mod enums;
pub mod ids;
pub mod structs;
pub mod zone;

// Re-export all public types at crate root for convenience.
pub use enums::{OrderDirection, RequestOrigin, Resource, StoringStructure, StructureKind};
pub use ids::{OrderId, RequestId, StructureId};
pub use structs::{MarketOrder, RequestKey, StandingOrderRequest, TerminalAction, TransferRequest};
pub use zone::{
    ContainerSite, ControllerState, Coord, DefenseLayout, Facilities, LinkSite, Rampart,
    RampartPlan, StorageState, TerminalState, UpgradeLayout, WorldCoord, ZoneName, ZoneState,
};
