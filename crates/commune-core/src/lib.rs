//! Tick clock, configuration, and the tick cycle for the commune scheduler.
//!
//! This crate owns the zone lifecycle and drives every commune through the
//! update, pre-tick, and run passes once per tick.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic tick counter.
//! - [`config`] -- Configuration loading from `commune-config.yaml` into
//!   strongly-typed structs.
//! - [`tick`] -- Scheduler state and the three-pass tick cycle.
//! - [`memory`] -- Persisted scheduler memory (tick and request registry).
//! - [`sim`] -- Deterministic in-memory [`WorldPlatform`] and scenario
//!   loading.
//!
//! [`WorldPlatform`]: commune_economy::WorldPlatform

pub mod clock;
pub mod config;
pub mod memory;
pub mod sim;
pub mod tick;
