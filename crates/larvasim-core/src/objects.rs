//! Simulation objects and the registry that orders their updates.
//!
//! Every object in a simulation implements [`SimulationObject`]. The two
//! kinds the model knows about are the [`Arena`] (at most one, always
//! updated first) and any number of [`Larva`] objects (updated in
//! registration order after the arena).
//!
//! The [`ObjectRegistry`] keeps the arena in its own slot and the larvae in
//! an ordered list. The update order is therefore `[arena?, larva_0,
//! larva_1, ...]` by construction, and a second arena cannot displace the
//! first.

use larvasim_types::{LarvaId, LarvaReport, OdorSource, Point2};
use tracing::{debug, warn};

use crate::context::StepContext;
use crate::error::ModelError;
use crate::observers::ObserverRegistry;

/// Anything advanced once per timestep.
pub trait SimulationObject {
    /// Advance internal state by one timestep of `ctx.dt()`.
    ///
    /// Larvae call [`StepContext::notify`] exactly once with their new
    /// state. Side effects must stay within the object's own state.
    ///
    /// # Errors
    ///
    /// Propagates [`ModelError`] from the context (missing arena, observer
    /// failure). The step aborts and the clock does not advance.
    fn update(&mut self, ctx: &mut StepContext<'_>) -> Result<(), ModelError>;
}

/// The bounded environment larvae move within.
pub trait Arena: SimulationObject {
    /// Whether `point` lies inside the arena.
    fn contains(&self, point: Point2) -> bool;

    /// The point inside the arena closest to `point`.
    fn clamp(&self, point: Point2) -> Point2;
}

/// A simulated larva.
pub trait Larva: SimulationObject {
    /// The larva's current state, as it would report it.
    fn report(&self) -> LarvaReport;
}

/// One entry of the update order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// The arena.
    Arena,
    /// A registered larva.
    Larva(LarvaId),
}

/// Counters from one [`ObjectRegistry::update_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdatePass {
    /// Objects whose `update` returned successfully.
    pub objects_updated: usize,
    /// Notifications sent during the pass.
    pub notifications: usize,
}

/// Ordered collection of simulation objects.
#[derive(Default)]
pub struct ObjectRegistry {
    /// The arena, updated before anything else.
    arena: Option<Box<dyn Arena>>,
    /// Larvae in registration order.
    larvae: Vec<(LarvaId, Box<dyn Larva>)>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the arena. It is updated first on every pass.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateArena`] if an arena is already
    /// registered; the registered arena is left untouched.
    pub fn register_arena(&mut self, arena: Box<dyn Arena>) -> Result<(), ModelError> {
        if self.arena.is_some() {
            return Err(ModelError::DuplicateArena);
        }
        self.arena = Some(arena);
        debug!("Arena registered");
        Ok(())
    }

    /// Append a larva to the update order and return its new ID.
    pub fn register_larva(&mut self, larva: Box<dyn Larva>) -> LarvaId {
        let id = LarvaId::new();
        self.larvae.push((id, larva));
        debug!(larva = %id, larvae = self.larvae.len(), "Larva registered");
        id
    }

    /// Update every object in order: the arena, then each larva.
    ///
    /// Stops at the first failing object. Objects updated before the
    /// failure keep their new state.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] raised by an object's update.
    pub fn update_all(
        &mut self,
        time: f64,
        dt: f64,
        source: &OdorSource,
        observers: &mut ObserverRegistry,
    ) -> Result<UpdatePass, ModelError> {
        let mut ctx = StepContext::new(time, dt, source, observers);
        let mut objects_updated: usize = 0;

        if let Some(arena) = self.arena.as_deref_mut() {
            ctx.begin_arena();
            arena.update(&mut ctx)?;
            objects_updated = objects_updated.saturating_add(1);
        }

        ctx.set_arena(self.arena.as_deref());

        for (id, larva) in &mut self.larvae {
            ctx.begin_object(Some(*id));
            larva.update(&mut ctx)?;
            let sent = ctx.object_notifications();
            if sent != 1 {
                warn!(larva = %id, sent, "Larva did not notify exactly once");
            }
            objects_updated = objects_updated.saturating_add(1);
        }

        Ok(UpdatePass {
            objects_updated,
            notifications: ctx.total_notifications(),
        })
    }

    /// The registered arena.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingArena`] if none is registered.
    pub fn arena(&self) -> Result<&dyn Arena, ModelError> {
        self.arena.as_deref().ok_or(ModelError::MissingArena)
    }

    /// Whether an arena is registered.
    pub const fn has_arena(&self) -> bool {
        self.arena.is_some()
    }

    /// Look up a larva by ID.
    pub fn larva(&self, id: LarvaId) -> Option<&dyn Larva> {
        self.larvae
            .iter()
            .find(|(larva_id, _)| *larva_id == id)
            .map(|(_, larva)| &**larva)
    }

    /// Iterate over larvae in registration order.
    pub fn larvae(&self) -> impl Iterator<Item = (LarvaId, &dyn Larva)> {
        self.larvae.iter().map(|(id, larva)| (*id, &**larva))
    }

    /// Number of registered larvae.
    pub const fn larva_count(&self) -> usize {
        self.larvae.len()
    }

    /// The full update order.
    pub fn update_order(&self) -> Vec<ObjectKind> {
        self.arena
            .iter()
            .map(|_| ObjectKind::Arena)
            .chain(self.larvae.iter().map(|(id, _)| ObjectKind::Larva(*id)))
            .collect()
    }
}

impl core::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("has_arena", &self.arena.is_some())
            .field("larvae", &self.larvae.len())
            .finish()
    }
}
