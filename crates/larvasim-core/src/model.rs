//! The simulation coordinator.
//!
//! [`SimulationModel`] owns the clock, the odor source, the object registry,
//! and the observer registry. It is created explicitly by whoever drives the
//! simulation and passed by reference to whatever needs it; several
//! independent models can coexist in one process.
//!
//! # Step protocol
//!
//! 1. Every object updates in order: arena first, then larvae in
//!    registration order. Each larva reports its new state through the
//!    [`StepContext`](crate::context::StepContext), and the report reaches
//!    every observer before the next object updates.
//! 2. The clock advances by exactly one `dt`.
//!
//! If any update or broadcast fails, the error is returned immediately and
//! the clock does not advance. Object state already mutated earlier in that
//! step stays mutated: a step is atomic with respect to time, not with
//! respect to object state.

use larvasim_types::{LarvaId, LarvaReport, OdorSource, StateNotification};
use tracing::debug;

use crate::clock::SimulationClock;
use crate::error::ModelError;
use crate::objects::{Arena, Larva, ObjectKind, ObjectRegistry};
use crate::observers::{ObserverRegistry, ObserverSink};

/// Summary of one successful [`SimulationModel::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Time at which the step ran (carried by its notifications).
    pub time: f64,
    /// Time after the clock advanced.
    pub next_time: f64,
    /// Objects updated during the step.
    pub objects_updated: usize,
    /// Notifications sent during the step.
    pub notifications: usize,
}

/// Coordinator of one simulation.
#[derive(Debug)]
pub struct SimulationModel {
    /// Elapsed time and fixed timestep.
    clock: SimulationClock,
    /// Fixed odor source.
    source: OdorSource,
    /// Arena and larvae in update order.
    objects: ObjectRegistry,
    /// Attached observers.
    observers: ObserverRegistry,
}

impl SimulationModel {
    /// Create a model whose clock starts at time 0.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if `dt` is not a finite
    /// positive number or the source parameters are invalid.
    pub fn new(dt: f64, source: OdorSource) -> Result<Self, ModelError> {
        Self::starting_at(0.0, dt, source)
    }

    /// Create a model whose clock starts at `start_time`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if `start_time` is not finite,
    /// `dt` is not a finite positive number, or the source parameters are
    /// invalid.
    pub fn starting_at(start_time: f64, dt: f64, source: OdorSource) -> Result<Self, ModelError> {
        let clock = SimulationClock::starting_at(start_time, dt).map_err(|err| {
            ModelError::Configuration {
                reason: err.to_string(),
            }
        })?;
        validate_source(&source)?;

        debug!(
            start_time,
            dt,
            source_x = source.position.x,
            source_y = source.position.y,
            strength = source.strength,
            decay_rate = source.decay_rate,
            "Simulation model created"
        );

        Ok(Self {
            clock,
            source,
            objects: ObjectRegistry::new(),
            observers: ObserverRegistry::new(),
        })
    }

    /// Register the arena. It will be updated before every larva.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateArena`] if an arena is already
    /// registered.
    pub fn register_arena<A: Arena + 'static>(&mut self, arena: A) -> Result<(), ModelError> {
        self.objects.register_arena(Box::new(arena))
    }

    /// Register a larva at the end of the update order.
    pub fn register_larva<L: Larva + 'static>(&mut self, larva: L) -> LarvaId {
        self.objects.register_larva(Box::new(larva))
    }

    /// Attach an observer for the lifetime of the model.
    pub fn attach<O: ObserverSink + 'static>(&mut self, observer: O) {
        self.observers.attach(Box::new(observer));
        debug!(observers = self.observers.len(), "Observer attached");
    }

    /// Advance the simulation by one timestep.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while updating objects or delivering
    /// notifications (the clock is then left unchanged), or
    /// [`ModelError::Clock`] if the step counter overflows.
    pub fn step(&mut self) -> Result<StepReport, ModelError> {
        let time = self.clock.current_time();
        let pass =
            self.objects
                .update_all(time, self.clock.dt(), &self.source, &mut self.observers)?;
        let next_time = self.clock.advance()?;

        debug!(
            step = self.clock.steps(),
            time,
            objects_updated = pass.objects_updated,
            notifications = pass.notifications,
            "Step complete"
        );

        Ok(StepReport {
            time,
            next_time,
            objects_updated: pass.objects_updated,
            notifications: pass.notifications,
        })
    }

    /// Broadcast a larva state report stamped with the current time and the
    /// source position.
    ///
    /// Larvae registered on the model report through their
    /// [`StepContext`](crate::context::StepContext) instead, which also
    /// records which larva sent the report. Calling this outside a step is
    /// allowed and uses the current clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ObserverBroadcast`] if an observer fails.
    pub fn notify(&mut self, report: LarvaReport) -> Result<(), ModelError> {
        let notification = StateNotification::from_report(
            self.clock.current_time(),
            None,
            report,
            self.source.position,
        );
        self.observers.broadcast(notification)?;
        Ok(())
    }

    /// Flush buffered output of every attached observer.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ObserverFlush`] for the first observer that
    /// fails to flush.
    pub fn flush_observers(&mut self) -> Result<(), ModelError> {
        self.observers.flush()
    }

    /// The registered arena.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingArena`] if none is registered.
    pub fn arena(&self) -> Result<&dyn Arena, ModelError> {
        self.objects.arena()
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Fixed timestep.
    pub const fn dt(&self) -> f64 {
        self.clock.dt()
    }

    /// Number of completed steps.
    pub const fn steps(&self) -> u64 {
        self.clock.steps()
    }

    /// The odor source.
    pub const fn source(&self) -> &OdorSource {
        &self.source
    }

    /// The simulation clock.
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Number of registered larvae.
    pub const fn larva_count(&self) -> usize {
        self.objects.larva_count()
    }

    /// Look up a registered larva.
    pub fn larva(&self, id: LarvaId) -> Option<&dyn Larva> {
        self.objects.larva(id)
    }

    /// Iterate over larvae in registration order.
    pub fn larvae(&self) -> impl Iterator<Item = (LarvaId, &dyn Larva)> {
        self.objects.larvae()
    }

    /// Number of attached observers.
    pub const fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// The update order for the next step.
    pub fn update_order(&self) -> Vec<ObjectKind> {
        self.objects.update_order()
    }
}

/// Check that the source parameters are usable.
fn validate_source(source: &OdorSource) -> Result<(), ModelError> {
    if !source.position.is_finite() {
        return Err(ModelError::Configuration {
            reason: "source position must be finite".to_owned(),
        });
    }
    if !source.strength.is_finite() {
        return Err(ModelError::Configuration {
            reason: format!("source strength must be finite, got {}", source.strength),
        });
    }
    if !source.decay_rate.is_finite() || source.decay_rate <= 0.0 {
        return Err(ModelError::Configuration {
            reason: format!(
                "source decay rate must be a finite positive number, got {}",
                source.decay_rate
            ),
        });
    }
    Ok(())
}
