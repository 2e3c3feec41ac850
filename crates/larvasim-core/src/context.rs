//! The view an object gets of the simulation while it updates.
//!
//! A [`StepContext`] carries the step's time, `dt`, and odor source, a
//! read-only handle to the arena, and the notification path to the
//! observers. It deliberately offers no way to register objects or attach
//! observers: the registries are exclusively borrowed for the whole update
//! pass, so the collections cannot change while they are being iterated.

use larvasim_types::{LarvaId, LarvaReport, OdorSource, StateNotification};
use tracing::trace;

use crate::error::ModelError;
use crate::objects::Arena;
use crate::observers::ObserverRegistry;

/// Per-object view of the simulation during an update pass.
pub struct StepContext<'a> {
    /// Simulation time before this step's advance.
    time: f64,
    /// Fixed timestep.
    dt: f64,
    /// The model's odor source.
    source: &'a OdorSource,
    /// The arena, when one is registered and is not the object updating.
    arena: Option<&'a dyn Arena>,
    /// Fan-out target for notifications.
    observers: &'a mut ObserverRegistry,
    /// The larva currently updating, if any.
    larva: Option<LarvaId>,
    /// Whether the arena itself is the object updating.
    updating_arena: bool,
    /// Notifications sent by the current object.
    object_notifications: usize,
    /// Notifications sent over the whole pass.
    total_notifications: usize,
}

impl<'a> StepContext<'a> {
    /// Build a context for one update pass.
    pub(crate) fn new(
        time: f64,
        dt: f64,
        source: &'a OdorSource,
        observers: &'a mut ObserverRegistry,
    ) -> Self {
        Self {
            time,
            dt,
            source,
            arena: None,
            observers,
            larva: None,
            updating_arena: false,
            object_notifications: 0,
            total_notifications: 0,
        }
    }

    /// Make the arena visible to the objects updated from now on.
    pub(crate) const fn set_arena(&mut self, arena: Option<&'a dyn Arena>) {
        self.arena = arena;
    }

    /// Mark the start of the arena's own update.
    pub(crate) const fn begin_arena(&mut self) {
        self.larva = None;
        self.updating_arena = true;
        self.object_notifications = 0;
    }

    /// Mark the start of an object's update.
    pub(crate) const fn begin_object(&mut self, larva: Option<LarvaId>) {
        self.larva = larva;
        self.updating_arena = false;
        self.object_notifications = 0;
    }

    /// Notifications sent since the last [`begin_object`](Self::begin_object).
    pub(crate) const fn object_notifications(&self) -> usize {
        self.object_notifications
    }

    /// Notifications sent over the whole pass.
    pub(crate) const fn total_notifications(&self) -> usize {
        self.total_notifications
    }

    /// Simulation time of this step (before the clock advances).
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Fixed timestep.
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// The odor source.
    pub const fn source(&self) -> &OdorSource {
        self.source
    }

    /// The registered arena.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ArenaUpdating`] when called from the arena's
    /// own update, and [`ModelError::MissingArena`] when no arena is
    /// registered.
    pub const fn arena(&self) -> Result<&'a dyn Arena, ModelError> {
        match self.arena {
            Some(arena) => Ok(arena),
            None if self.updating_arena => Err(ModelError::ArenaUpdating),
            None => Err(ModelError::MissingArena),
        }
    }

    /// The larva currently updating, if the updating object is a larva.
    pub const fn larva(&self) -> Option<LarvaId> {
        self.larva
    }

    /// Report freshly computed larva state to every observer.
    ///
    /// The report is stamped with this step's time, the updating larva's
    /// ID, and the source position, then delivered synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ObserverBroadcast`] if an observer fails.
    pub fn notify(&mut self, report: LarvaReport) -> Result<(), ModelError> {
        let notification =
            StateNotification::from_report(self.time, self.larva, report, self.source.position);
        trace!(
            time = self.time,
            larva = ?self.larva,
            behavior = %report.behavior,
            "Larva state reported"
        );
        self.object_notifications = self.object_notifications.saturating_add(1);
        self.total_notifications = self.total_notifications.saturating_add(1);
        self.observers.broadcast(notification)?;
        Ok(())
    }
}

impl core::fmt::Debug for StepContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StepContext")
            .field("time", &self.time)
            .field("dt", &self.dt)
            .field("source", self.source)
            .field("has_arena", &self.arena.is_some())
            .field("observers", &self.observers.len())
            .field("larva", &self.larva)
            .finish_non_exhaustive()
    }
}
