//! Error types for the `larvasim-world` crate.

/// Errors raised when building arenas or larvae.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Arena geometry is degenerate or not finite.
    #[error("invalid arena: {reason}")]
    InvalidArena {
        /// What is wrong with the geometry.
        reason: String,
    },

    /// Larva parameters or initial state are unusable.
    #[error("invalid larva: {reason}")]
    InvalidLarva {
        /// What is wrong with the parameters.
        reason: String,
    },
}
