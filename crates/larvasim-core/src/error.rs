//! Error types for the `larvasim-core` crate.
//!
//! Every fallible operation on the model returns [`ModelError`]. Observer
//! implementations report failures with [`ObserverError`], which the model
//! wraps together with the failing observer's position and name.

use crate::clock::ClockError;

/// Errors surfaced by the simulation model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Invalid construction parameters (e.g. `dt <= 0`).
    #[error("invalid model configuration: {reason}")]
    Configuration {
        /// Explanation of what is wrong with the parameters.
        reason: String,
    },

    /// An operation needed the arena but none has been registered.
    #[error("no arena registered")]
    MissingArena,

    /// The arena asked for itself through its own step context. The arena
    /// is exclusively borrowed while it updates, so it cannot also be
    /// handed out as a shared reference.
    #[error("the arena is not reachable during its own update")]
    ArenaUpdating,

    /// A second arena was registered.
    #[error("an arena is already registered")]
    DuplicateArena,

    /// An observer failed while handling a notification. Observers after
    /// it were not notified of that event.
    #[error("observer #{index} ({observer}) failed: {source}")]
    ObserverBroadcast {
        /// Attachment position of the failing observer.
        index: usize,
        /// Diagnostic name of the failing observer.
        observer: String,
        /// The observer's error.
        #[source]
        source: ObserverError,
    },

    /// An observer failed to flush buffered output. Observers after it
    /// were not flushed.
    #[error("observer #{index} ({observer}) failed to flush: {source}")]
    ObserverFlush {
        /// Attachment position of the failing observer.
        index: usize,
        /// Diagnostic name of the failing observer.
        observer: String,
        /// The observer's error.
        #[source]
        source: ObserverError,
    },

    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Errors an observer can report while handling a notification.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// Writing the notification somewhere failed.
    #[error("observer I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The receiving end of a channel observer is gone.
    #[error("observer channel disconnected")]
    Disconnected,

    /// The observer refused the notification.
    #[error("observer rejected notification: {reason}")]
    Rejected {
        /// Why the notification was refused.
        reason: String,
    },
}
