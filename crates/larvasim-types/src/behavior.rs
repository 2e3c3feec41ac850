//! Larva behavior tags.

use serde::{Deserialize, Serialize};

/// The behavior a larva is in when it reports its state.
///
/// Larvae alternate between running straight and casting (sweeping the head
/// side to side to sample the odor gradient).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    /// Crawling forward along the current heading.
    #[default]
    Run,
    /// Sweeping the head to the left of the body axis.
    CastLeft,
    /// Sweeping the head to the right of the body axis.
    CastRight,
    /// Stationary.
    Stop,
}

impl BehaviorState {
    /// Whether this is one of the casting states.
    pub const fn is_casting(self) -> bool {
        matches!(self, Self::CastLeft | Self::CastRight)
    }

    /// The opposite casting side. Non-casting states map to themselves.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::CastLeft => Self::CastRight,
            Self::CastRight => Self::CastLeft,
            other => other,
        }
    }
}

impl core::fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Run => "run",
            Self::CastLeft => "cast_left",
            Self::CastRight => "cast_right",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}
