//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the tick loop.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration or scenario loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: commune_core::config::ConfigError,
    },

    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: commune_core::tick::TickError,
    },

    /// Scheduler memory could not be encoded or decoded.
    #[error("memory error: {source}")]
    Memory {
        /// The underlying memory error.
        #[from]
        source: commune_core::memory::MemoryError,
    },

    /// Scheduler memory could not be read or written.
    #[error("memory file {path}: {source}")]
    MemoryFile {
        /// Path of the memory file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
