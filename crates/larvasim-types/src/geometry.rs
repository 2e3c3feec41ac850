//! Planar geometry for larva bodies, arena bounds, and the odor source.
//!
//! [`Point2`] doubles as a point and a displacement vector. It is `Copy` and
//! carries no shared state, so every default position (the origin included)
//! is a fresh value per use.

use core::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point (or displacement) in the simulation plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point2 {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit-scaled vector of length `length` pointing along `angle`
    /// (radians, counter-clockwise from the +x axis).
    pub fn from_polar(length: f64, angle: f64) -> Self {
        Self {
            x: length * angle.cos(),
            y: length * angle.sin(),
        }
    }

    /// Euclidean length of this vector.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Heading of this vector in radians, in `(-pi, pi]`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Whether both coordinates are finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2 {
    type Output = Self;

    #[allow(clippy::arithmetic_side_effects)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Self;

    #[allow(clippy::arithmetic_side_effects)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Self;

    #[allow(clippy::arithmetic_side_effects)]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2 {
    type Output = Self;

    #[allow(clippy::arithmetic_side_effects)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_pythagorean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn polar_round_trips_through_angle() {
        let v = Point2::from_polar(2.0, core::f64::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 2.0).abs() < 1e-12);
        assert!((v.angle() - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn origin_is_a_fresh_value() {
        let mut a = Point2::ORIGIN;
        a.x = 7.0;
        assert_eq!(a.x, 7.0);
        assert_eq!(Point2::ORIGIN, Point2::new(0.0, 0.0));
    }

    #[test]
    fn vector_ops() {
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(0.5, -1.0);
        assert_eq!(a + b, Point2::new(1.5, 1.0));
        assert_eq!(a - b, Point2::new(0.5, 3.0));
        assert_eq!(a * 2.0, Point2::new(2.0, 4.0));
        assert_eq!(-a, Point2::new(-1.0, -2.0));
    }
}
