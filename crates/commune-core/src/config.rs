//! Configuration loading and typed config structures for the scheduler.
//!
//! The canonical configuration lives in `commune-config.yaml` at the project
//! root. Every section and field has a default, so an empty file is a valid
//! configuration.

use std::path::Path;

use commune_economy::{PeriodicRefresh, RefreshPolicy, SeededRandomRefresh, TradeSettings};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scheduler configuration.
///
/// Mirrors the structure of `commune-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Trade switches and limits.
    #[serde(default)]
    pub settings: TradeSettings,

    /// When slow metrics are recomputed.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Harness run bounds.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SchedulerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the refresh policy this configuration selects.
    ///
    /// A random policy without its own seed uses the simulation seed.
    pub fn build_refresh(&self) -> Box<dyn RefreshPolicy> {
        match self.refresh {
            RefreshConfig::Periodic { period } => Box::new(PeriodicRefresh::new(period)),
            RefreshConfig::Random { seed, one_in } => Box::new(SeededRandomRefresh::new(
                seed.unwrap_or(self.simulation.seed),
                one_in,
            )),
        }
    }
}

/// Slow-metric refresh policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RefreshConfig {
    /// Refresh every `period` ticks.
    Periodic {
        /// Ticks between refreshes.
        #[serde(default = "default_period")]
        period: u64,
    },
    /// Refresh with probability `1 / one_in` each tick.
    Random {
        /// Generator seed. Falls back to the simulation seed.
        #[serde(default)]
        seed: Option<u64>,
        /// Odds denominator.
        #[serde(default = "default_one_in")]
        one_in: u32,
    },
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::Random {
            seed: None,
            one_in: default_one_in(),
        }
    }
}

const fn default_period() -> u64 {
    20
}

const fn default_one_in() -> u32 {
    SeededRandomRefresh::DEFAULT_ONE_IN
}

/// Bounds for a harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Number of ticks to run.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Seed for every random choice in the run.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            seed: 0,
        }
    }
}

const fn default_max_ticks() -> u64 {
    100
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_owned()
}
