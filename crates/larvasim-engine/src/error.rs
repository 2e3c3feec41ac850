//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the simulation run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Model construction or registration failed.
    #[error("model error: {source}")]
    Model {
        /// The underlying model error.
        #[from]
        source: larvasim_core::ModelError,
    },

    /// Arena or larva construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: larvasim_world::WorldError,
    },

    /// The simulation run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: crate::runner::RunnerError,
    },

    /// Larva spawning was misconfigured.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of what went wrong.
        message: String,
    },

    /// An output file could not be opened.
    #[error("output error for {path}: {source}")]
    Output {
        /// The file that could not be opened.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
