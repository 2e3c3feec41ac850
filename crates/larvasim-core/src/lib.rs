//! Simulation clock, object registry, observer fan-out, and the step
//! protocol for the larva chemotaxis simulation.
//!
//! One [`SimulationModel`] coordinates a simulation. Each call to
//! [`SimulationModel::step`] updates the arena (if any) and then every
//! larva in registration order. Larvae report their new state through the
//! [`StepContext`] they are handed, and each report is delivered
//! synchronously to every attached observer before the next object updates.
//! The clock advances only after the whole pass succeeded.
//!
//! # Modules
//!
//! - [`clock`] -- [`SimulationClock`]: elapsed time derived from a step
//!   counter and a fixed `dt`.
//! - [`context`] -- [`StepContext`]: what an object sees during its update.
//! - [`error`] -- [`ModelError`] and [`ObserverError`].
//! - [`model`] -- [`SimulationModel`], the coordinator.
//! - [`objects`] -- [`SimulationObject`], [`Arena`], [`Larva`] capabilities
//!   and the [`ObjectRegistry`] that orders them.
//! - [`observers`] -- [`ObserverSink`] capability and [`ObserverRegistry`].

pub mod clock;
pub mod context;
pub mod error;
pub mod model;
pub mod objects;
pub mod observers;

pub use clock::{ClockError, SimulationClock};
pub use context::StepContext;
pub use error::{ModelError, ObserverError};
pub use model::{SimulationModel, StepReport};
pub use objects::{Arena, Larva, ObjectKind, ObjectRegistry, SimulationObject, UpdatePass};
pub use observers::{ObserverRegistry, ObserverSink};
