//! Reference arenas and larvae for the larva chemotaxis simulation.
//!
//! The core crate only defines what an arena and a larva must be able to
//! do. This crate supplies concrete ones so a simulation can run end to
//! end.
//!
//! # Modules
//!
//! - [`arena`] -- [`RectArena`], [`CircularArena`], and the [`ArenaKind`]
//!   wrapper used when the shape comes from configuration.
//! - [`error`] -- Error types for invalid geometry and larva parameters.
//! - [`larva`] -- [`ChemotaxisLarva`], a two-segment larva that runs up the
//!   odor gradient and casts when it loses it.

pub mod arena;
pub mod error;
pub mod larva;

// Re-export primary types at crate root.
pub use arena::{ArenaKind, CircularArena, RectArena};
pub use error::WorldError;
pub use larva::{ChemotaxisLarva, LarvaParams};
