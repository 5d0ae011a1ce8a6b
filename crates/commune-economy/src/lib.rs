//! Per-tick economics for communes.
//!
//! This crate holds everything a commune decides on its own in a tick:
//!
//! - [`metrics`] -- Tick-scoped and slow derived metrics with memoization
//! - [`refresh`] -- Injectable policy for invalidating slow metrics
//! - [`commune`] -- A zone snapshot paired with its metrics cache
//! - [`targets`] -- Per-resource stock minimums and maximums
//! - [`transaction`] -- Terminal transfer fees and the largest affordable send
//! - [`registry`] -- The shared internal request registry and request generation
//! - [`allies`] -- The allied request channel
//! - [`matching`] -- Choosing which request to fulfil
//! - [`market`] -- Buying and selling on the open market
//! - [`terminal`] -- The one-action-per-tick stage chain
//! - [`defense`] -- The defense brief
//! - [`platform`] -- Traits for the world and the defense subsystem
//! - [`settings`] -- Trade switches and limits
//! - [`constants`] -- World constants
//! - [`error`] -- Error types

pub mod allies;
pub mod commune;
pub mod constants;
pub mod defense;
pub mod error;
pub mod market;
pub mod matching;
pub mod metrics;
pub mod platform;
pub mod refresh;
pub mod registry;
pub mod settings;
pub mod targets;
pub mod terminal;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use allies::{AllySegment, AlliedChannel};
pub use commune::Commune;
pub use defense::DefenseBrief;
pub use error::{EconomyError, PlatformRejection};
pub use metrics::{MetricKind, Metrics};
pub use platform::{DefenseSubsystem, WorldPlatform};
pub use refresh::{PeriodicRefresh, RefreshPolicy, SeededRandomRefresh};
pub use registry::RequestRegistry;
pub use settings::TradeSettings;
pub use terminal::{NoActionReason, StageResult, TerminalContext};
