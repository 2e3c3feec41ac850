//! Per-larva state payloads exchanged between larvae, the model, and
//! observers.
//!
//! A larva reports a [`LarvaReport`] once per update. The model stamps it
//! with the current simulation time, the larva's ID, and the source
//! position, producing a [`StateNotification`] that every attached observer
//! receives by value.

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorState;
use crate::geometry::Point2;
use crate::ids::LarvaId;

/// State a larva reports after computing its update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LarvaReport {
    /// Behavior the larva is in after the update.
    pub behavior: BehaviorState,
    /// Head segment position.
    pub head: Point2,
    /// Joint position between the head and tail segments.
    pub joint: Point2,
    /// Head speed over the last update.
    pub velocity: f64,
    /// Head heading in radians.
    pub head_angle: f64,
}

/// Immutable snapshot of one larva at one timestep, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateNotification {
    /// Simulation time of the step that produced this state (before the
    /// clock advanced).
    pub time: f64,
    /// Reporting larva, when the report came from a registered larva's
    /// update.
    pub larva: Option<LarvaId>,
    /// Behavior tag.
    pub behavior: BehaviorState,
    /// Head segment position.
    pub head: Point2,
    /// Joint position.
    pub joint: Point2,
    /// Head speed.
    pub velocity: f64,
    /// Head heading in radians.
    pub head_angle: f64,
    /// Position of the odor source.
    pub source_position: Point2,
}

impl StateNotification {
    /// Stamp a report with time, origin, and source position.
    pub const fn from_report(
        time: f64,
        larva: Option<LarvaId>,
        report: LarvaReport,
        source_position: Point2,
    ) -> Self {
        Self {
            time,
            larva,
            behavior: report.behavior,
            head: report.head,
            joint: report.joint,
            velocity: report.velocity,
            head_angle: report.head_angle,
            source_position,
        }
    }

    /// The larva-reported part of this notification.
    pub const fn report(&self) -> LarvaReport {
        LarvaReport {
            behavior: self.behavior,
            head: self.head,
            joint: self.joint,
            velocity: self.velocity,
            head_angle: self.head_angle,
        }
    }
}
