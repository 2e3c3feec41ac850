//! The chemical-gradient source that larvae navigate towards.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2;

/// A point odor source with a Gaussian concentration profile.
///
/// The source is fixed for the lifetime of a model. Concentration at
/// distance `d` is `strength * exp(-d^2 / (2 * decay_rate^2))`, so
/// `decay_rate` is the spatial scale over which the odor fades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdorSource {
    /// Where the odor is emitted.
    pub position: Point2,
    /// Peak concentration at the source position.
    pub strength: f64,
    /// Spatial decay scale (must be positive).
    pub decay_rate: f64,
}

impl OdorSource {
    /// Create a source from its three parameters.
    pub const fn new(position: Point2, strength: f64, decay_rate: f64) -> Self {
        Self {
            position,
            strength,
            decay_rate,
        }
    }

    /// Odor concentration sensed at `point`.
    pub fn concentration_at(&self, point: Point2) -> f64 {
        let d = point.distance(self.position);
        let scale = 2.0 * self.decay_rate * self.decay_rate;
        self.strength * (-(d * d) / scale).exp()
    }
}

impl Default for OdorSource {
    /// Source at the origin with strength 10 and decay rate 5.
    fn default() -> Self {
        Self::new(Point2::ORIGIN, 10.0, 5.0)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn peak_concentration_at_source() {
        let source = OdorSource::default();
        assert_eq!(source.concentration_at(Point2::ORIGIN), 10.0);
    }

    #[test]
    fn concentration_decreases_with_distance() {
        let source = OdorSource::default();
        let near = source.concentration_at(Point2::new(1.0, 0.0));
        let far = source.concentration_at(Point2::new(5.0, 0.0));
        assert!(near > far);
        assert!(far > 0.0);
        // One decay scale away: strength * e^(-1/2)
        let expected = 10.0 * (-0.5_f64).exp();
        assert!((far - expected).abs() < 1e-12);
    }
}
