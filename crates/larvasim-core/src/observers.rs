//! Observer capability and synchronous fan-out.
//!
//! Observers (renderers, loggers, analysis tools) attach to a model for its
//! whole lifetime; there is no detach. Each notification is delivered to
//! every observer in attachment order. Delivery is fail-fast: the first
//! observer error aborts the broadcast and observers after it do not see
//! that notification.

use std::sync::mpsc::Sender;

use larvasim_types::StateNotification;
use tracing::trace;

use crate::error::{ModelError, ObserverError};

/// A consumer of per-larva state notifications.
pub trait ObserverSink {
    /// Handle one notification. Must not block indefinitely: broadcast is
    /// synchronous and holds up the simulation step.
    ///
    /// # Errors
    ///
    /// Any error aborts the current broadcast and the step that caused it.
    fn on_state(&mut self, notification: StateNotification) -> Result<(), ObserverError>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        "observer"
    }

    /// Push out anything buffered. Called by whoever drives the model when
    /// a run ends.
    ///
    /// # Errors
    ///
    /// Reports the failure to write buffered output.
    fn flush(&mut self) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Forward notifications over a channel. A dropped receiver is reported as
/// [`ObserverError::Disconnected`].
impl ObserverSink for Sender<StateNotification> {
    fn on_state(&mut self, notification: StateNotification) -> Result<(), ObserverError> {
        self.send(notification)
            .map_err(|_closed| ObserverError::Disconnected)
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Attached observers in attachment order. Duplicates are allowed; each
/// attachment receives its own copy of every notification.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn ObserverSink>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer permanently.
    pub fn attach(&mut self, observer: Box<dyn ObserverSink>) {
        self.observers.push(observer);
    }

    /// Deliver `notification` to every observer in attachment order.
    /// Returns the number of observers notified.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ObserverBroadcast`] for the first failing
    /// observer; later observers are skipped.
    pub fn broadcast(&mut self, notification: StateNotification) -> Result<usize, ModelError> {
        for (index, observer) in self.observers.iter_mut().enumerate() {
            observer
                .on_state(notification)
                .map_err(|source| ModelError::ObserverBroadcast {
                    index,
                    observer: observer.name().to_owned(),
                    source,
                })?;
        }
        trace!(
            time = notification.time,
            observers = self.observers.len(),
            "Notification broadcast"
        );
        Ok(self.observers.len())
    }

    /// Flush every observer, in attachment order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ObserverFlush`] for the first observer that
    /// fails to flush; later observers are not flushed.
    pub fn flush(&mut self) -> Result<(), ModelError> {
        for (index, observer) in self.observers.iter_mut().enumerate() {
            observer
                .flush()
                .map_err(|source| ModelError::ObserverFlush {
                    index,
                    observer: observer.name().to_owned(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Number of attached observers.
    pub const fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observers are attached.
    pub const fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl core::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.observers.iter().map(|o| o.name()).collect();
        f.debug_struct("ObserverRegistry")
            .field("observers", &names)
            .finish()
    }
}
