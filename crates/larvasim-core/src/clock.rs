//! Simulation clock.
//!
//! The clock is the single source of truth for simulation time. It stores
//! the start time, the fixed timestep `dt`, and an integer step counter.
//! Current time is always derived as `start + steps * dt`, never
//! accumulated, so after `n` advances the time is exactly `start + n * dt`
//! no matter how many steps have run.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Step counter would overflow.
    #[error("step counter overflow: cannot advance beyond u64::MAX")]
    StepOverflow,

    /// Invalid clock parameters (e.g. non-positive `dt`).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the parameters.
        reason: String,
    },
}

/// Monotonic simulation clock with a fixed timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    /// Time at step 0.
    start: f64,

    /// Fixed timestep, validated positive and finite.
    dt: f64,

    /// Number of completed advances.
    steps: u64,
}

impl SimulationClock {
    /// Create a clock starting at time 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `dt` is not a finite
    /// positive number.
    pub fn new(dt: f64) -> Result<Self, ClockError> {
        Self::starting_at(0.0, dt)
    }

    /// Create a clock starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `start` is not finite or
    /// `dt` is not a finite positive number.
    pub fn starting_at(start: f64, dt: f64) -> Result<Self, ClockError> {
        if !start.is_finite() {
            return Err(ClockError::InvalidConfig {
                reason: format!("start time must be finite, got {start}"),
            });
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("dt must be a finite positive number, got {dt}"),
            });
        }
        Ok(Self {
            start,
            dt,
            steps: 0,
        })
    }

    /// Advance the clock by one timestep. Returns the new current time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::StepOverflow`] if the step counter would
    /// exceed `u64::MAX`.
    pub fn advance(&mut self) -> Result<f64, ClockError> {
        self.steps = self.steps.checked_add(1).ok_or(ClockError::StepOverflow)?;
        Ok(self.current_time())
    }

    /// Current simulation time.
    #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
    pub fn current_time(&self) -> f64 {
        // Exact for any step count below 2^53, far beyond any realistic run.
        self.start + (self.steps as f64) * self.dt
    }

    /// The fixed timestep.
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of completed advances.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Time at step 0.
    pub const fn start_time(&self) -> f64 {
        self.start
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::suboptimal_flops
)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero() {
        let clock = SimulationClock::new(0.1).unwrap();
        assert_eq!(clock.current_time(), 0.0);
        assert_eq!(clock.steps(), 0);
        assert_eq!(clock.dt(), 0.1);
    }

    #[test]
    fn clock_advances_by_dt() {
        let mut clock = SimulationClock::new(0.5).unwrap();
        assert_eq!(clock.advance().unwrap(), 0.5);
        assert_eq!(clock.advance().unwrap(), 1.0);
        assert_eq!(clock.steps(), 2);
    }

    #[test]
    fn no_drift_after_many_steps() {
        let t0 = 2.5;
        let dt = 0.1;
        let mut clock = SimulationClock::starting_at(t0, dt).unwrap();
        for n in 1..=10_000_u64 {
            let now = clock.advance().unwrap();
            assert_eq!(now, t0 + (n as f64) * dt);
        }
        assert_eq!(clock.current_time(), t0 + 10_000.0 * dt);
    }

    #[test]
    fn integer_multiple_dt_is_exact() {
        let mut clock = SimulationClock::new(0.25).unwrap();
        for _ in 0..8 {
            let _ = clock.advance();
        }
        assert_eq!(clock.current_time(), 2.0);
    }

    #[test]
    fn zero_dt_is_rejected() {
        assert!(matches!(
            SimulationClock::new(0.0),
            Err(ClockError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn negative_and_nan_dt_are_rejected() {
        assert!(SimulationClock::new(-0.1).is_err());
        assert!(SimulationClock::new(f64::NAN).is_err());
        assert!(SimulationClock::new(f64::INFINITY).is_err());
    }

    #[test]
    fn non_finite_start_is_rejected() {
        assert!(SimulationClock::starting_at(f64::NAN, 0.1).is_err());
    }
}
