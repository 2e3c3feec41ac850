//! Bounded arenas.
//!
//! Arenas are static: their `update` only counts ticks. Larvae query them
//! during their own update to keep the head inside the walls.

use larvasim_core::{Arena, ModelError, SimulationObject, StepContext};
use larvasim_types::Point2;

use crate::error::WorldError;

/// Axis-aligned rectangular arena.
#[derive(Debug, Clone, PartialEq)]
pub struct RectArena {
    /// Lower-left corner.
    min: Point2,
    /// Upper-right corner.
    max: Point2,
    /// Updates received.
    ticks: u64,
}

impl RectArena {
    /// Create an arena spanning `min` to `max`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidArena`] if a corner is not finite or
    /// the rectangle has no area.
    pub fn new(min: Point2, max: Point2) -> Result<Self, WorldError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(WorldError::InvalidArena {
                reason: "rectangle corners must be finite".to_owned(),
            });
        }
        if min.x >= max.x || min.y >= max.y {
            return Err(WorldError::InvalidArena {
                reason: format!(
                    "rectangle min ({}, {}) must be below max ({}, {})",
                    min.x, min.y, max.x, max.y
                ),
            });
        }
        Ok(Self { min, max, ticks: 0 })
    }

    /// Create a `width` x `height` arena centered on the origin.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidArena`] for non-positive or non-finite
    /// dimensions.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn centered(width: f64, height: f64) -> Result<Self, WorldError> {
        let half = Point2::new(width / 2.0, height / 2.0);
        Self::new(-half, half)
    }

    /// Lower-left corner.
    pub const fn min(&self) -> Point2 {
        self.min
    }

    /// Upper-right corner.
    pub const fn max(&self) -> Point2 {
        self.max
    }

    /// Number of updates received.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl SimulationObject for RectArena {
    fn update(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), ModelError> {
        self.ticks = self.ticks.saturating_add(1);
        Ok(())
    }
}

impl Arena for RectArena {
    fn contains(&self, point: Point2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    fn clamp(&self, point: Point2) -> Point2 {
        Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Circular arena (a Petri dish).
#[derive(Debug, Clone, PartialEq)]
pub struct CircularArena {
    /// Dish center.
    center: Point2,
    /// Dish radius.
    radius: f64,
    /// Updates received.
    ticks: u64,
}

impl CircularArena {
    /// Create a dish of `radius` around `center`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidArena`] if the center is not finite or
    /// the radius is not a finite positive number.
    pub fn new(center: Point2, radius: f64) -> Result<Self, WorldError> {
        if !center.is_finite() {
            return Err(WorldError::InvalidArena {
                reason: "circle center must be finite".to_owned(),
            });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(WorldError::InvalidArena {
                reason: format!("circle radius must be a finite positive number, got {radius}"),
            });
        }
        Ok(Self {
            center,
            radius,
            ticks: 0,
        })
    }

    /// Dish center.
    pub const fn center(&self) -> Point2 {
        self.center
    }

    /// Dish radius.
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of updates received.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl SimulationObject for CircularArena {
    fn update(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), ModelError> {
        self.ticks = self.ticks.saturating_add(1);
        Ok(())
    }
}

impl Arena for CircularArena {
    fn contains(&self, point: Point2) -> bool {
        point.distance(self.center) <= self.radius
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn clamp(&self, point: Point2) -> Point2 {
        let offset = point - self.center;
        let distance = offset.length();
        if distance <= self.radius {
            return point;
        }
        self.center + offset * (self.radius / distance)
    }
}

/// An arena whose shape is chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaKind {
    /// Rectangular arena.
    Rect(RectArena),
    /// Circular arena.
    Circle(CircularArena),
}

impl SimulationObject for ArenaKind {
    fn update(&mut self, ctx: &mut StepContext<'_>) -> Result<(), ModelError> {
        match self {
            Self::Rect(arena) => arena.update(ctx),
            Self::Circle(arena) => arena.update(ctx),
        }
    }
}

impl Arena for ArenaKind {
    fn contains(&self, point: Point2) -> bool {
        match self {
            Self::Rect(arena) => arena.contains(point),
            Self::Circle(arena) => arena.contains(point),
        }
    }

    fn clamp(&self, point: Point2) -> Point2 {
        match self {
            Self::Rect(arena) => arena.clamp(point),
            Self::Circle(arena) => arena.clamp(point),
        }
    }
}

impl From<RectArena> for ArenaKind {
    fn from(arena: RectArena) -> Self {
        Self::Rect(arena)
    }
}

impl From<CircularArena> for ArenaKind {
    fn from(arena: CircularArena) -> Self {
        Self::Circle(arena)
    }
}
