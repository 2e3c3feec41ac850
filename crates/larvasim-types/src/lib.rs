//! Shared value types for the larva chemotaxis simulation.
//!
//! Everything in this crate is a plain value: cheap to copy, serializable,
//! and free of simulation logic. The core, the reference world, and the
//! engine binary all speak in these types.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for larva identifiers
//! - [`geometry`] -- [`Point2`], the 2D point/vector used for all positions
//! - [`behavior`] -- [`BehaviorState`], the larva behavior tag
//! - [`source`] -- [`OdorSource`], the fixed chemical-gradient source
//! - [`notification`] -- [`LarvaReport`] and [`StateNotification`] payloads

pub mod behavior;
pub mod geometry;
pub mod ids;
pub mod notification;
pub mod source;

// Re-export all public types at crate root for convenience.
pub use behavior::BehaviorState;
pub use geometry::Point2;
pub use ids::LarvaId;
pub use notification::{LarvaReport, StateNotification};
pub use source::OdorSource;
