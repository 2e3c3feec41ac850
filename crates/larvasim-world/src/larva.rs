//! Two-segment chemotaxis larva.
//!
//! The body is a head segment and a tail segment joined at `joint`. The
//! larva alternates between two behaviors:
//!
//! - **Run**: the head crawls forward along `head_angle` and the joint
//!   trails one body length behind. When the odor concentration at the head
//!   drops by more than `turn_threshold` between updates, the larva starts
//!   casting. Hitting a wall turns it around and starts a cast as well.
//! - **Cast**: the head swings around the joint, first to one side (chosen
//!   at random) and then to the other, up to `cast_amplitude` from the body
//!   axis. As soon as the head senses more odor than when the cast began,
//!   the larva runs in that direction. After a full sweep without
//!   improvement it runs along the best direction it sampled.
//!
//! A larva whose head gets within half a body length of the source stops.

use core::f64::consts::PI;

use larvasim_core::{Arena, Larva, ModelError, SimulationObject, StepContext};
use larvasim_types::{BehaviorState, LarvaReport, OdorSource, Point2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::trace;

use crate::error::WorldError;

/// Distance below which a clamped head counts as not having hit a wall.
const WALL_EPSILON: f64 = 1e-9;

/// Side switches that make up one full left-right sweep.
const FULL_SWEEP_FLIPS: u8 = 2;

/// Tunable larva parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LarvaParams {
    /// Distance from head to joint.
    pub body_length: f64,
    /// Head speed while running (distance per unit time).
    pub run_speed: f64,
    /// Angular speed of the head while casting (radians per unit time).
    pub cast_speed: f64,
    /// Largest head deflection from the body axis while casting (radians).
    pub cast_amplitude: f64,
    /// Concentration change treated as noise when deciding to cast or run.
    pub turn_threshold: f64,
}

impl Default for LarvaParams {
    fn default() -> Self {
        Self {
            body_length: 1.0,
            run_speed: 1.0,
            cast_speed: 2.0,
            cast_amplitude: 0.8,
            turn_threshold: 0.0,
        }
    }
}

impl LarvaParams {
    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidLarva`] describing the first bad value.
    pub fn validate(&self) -> Result<(), WorldError> {
        let checks = [
            ("body_length", self.body_length, self.body_length > 0.0),
            ("run_speed", self.run_speed, self.run_speed >= 0.0),
            ("cast_speed", self.cast_speed, self.cast_speed > 0.0),
            (
                "cast_amplitude",
                self.cast_amplitude,
                self.cast_amplitude > 0.0 && self.cast_amplitude <= PI,
            ),
            (
                "turn_threshold",
                self.turn_threshold,
                self.turn_threshold >= 0.0,
            ),
        ];
        for (name, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(WorldError::InvalidLarva {
                    reason: format!("{name} out of range: {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Progress of an ongoing cast.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cast {
    /// Body axis heading when the cast began.
    axis: f64,
    /// Current head deflection from `axis`.
    offset: f64,
    /// Concentration sensed when the cast began.
    reference: f64,
    /// Heading with the highest concentration sampled so far.
    best_angle: f64,
    /// Highest concentration sampled so far.
    best_concentration: f64,
    /// Side switches so far.
    flips: u8,
}

/// A larva that climbs the odor gradient by running and casting.
#[derive(Debug, Clone)]
pub struct ChemotaxisLarva {
    params: LarvaParams,
    head: Point2,
    joint: Point2,
    head_angle: f64,
    velocity: f64,
    behavior: BehaviorState,
    /// Concentration at the head after the previous run update.
    last_concentration: Option<f64>,
    cast: Option<Cast>,
    rng: SmallRng,
}

impl ChemotaxisLarva {
    /// Create a running larva with its head at `head`, facing `head_angle`.
    /// `seed` drives the choice of cast side.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidLarva`] for invalid parameters or a
    /// non-finite initial pose.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn new(
        head: Point2,
        head_angle: f64,
        params: LarvaParams,
        seed: u64,
    ) -> Result<Self, WorldError> {
        params.validate()?;
        if !head.is_finite() || !head_angle.is_finite() {
            return Err(WorldError::InvalidLarva {
                reason: "initial head position and angle must be finite".to_owned(),
            });
        }
        Ok(Self {
            params,
            head,
            joint: head - Point2::from_polar(params.body_length, head_angle),
            head_angle,
            velocity: 0.0,
            behavior: BehaviorState::Run,
            last_concentration: None,
            cast: None,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Current behavior.
    pub const fn behavior(&self) -> BehaviorState {
        self.behavior
    }

    /// Head position.
    pub const fn head(&self) -> Point2 {
        self.head
    }

    /// Joint position.
    pub const fn joint(&self) -> Point2 {
        self.joint
    }

    /// Parameters this larva was built with.
    pub const fn params(&self) -> &LarvaParams {
        &self.params
    }

    fn set_behavior(&mut self, next: BehaviorState) {
        if next != self.behavior {
            trace!(from = %self.behavior, to = %next, "Behavior transition");
            self.behavior = next;
        }
    }

    /// Keep the joint one body length behind the head.
    #[allow(clippy::arithmetic_side_effects)]
    fn trail_joint(&mut self) {
        let axis = self.joint - self.head;
        let length = axis.length();
        self.joint = if length > f64::EPSILON {
            self.head + axis * (self.params.body_length / length)
        } else {
            self.head - Point2::from_polar(self.params.body_length, self.head_angle)
        };
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn run(&mut self, dt: f64, arena: &dyn Arena, source: &OdorSource) {
        let target = self.head + Point2::from_polar(self.params.run_speed * dt, self.head_angle);
        let clamped = arena.clamp(target);
        let hit_wall = clamped.distance(target) > WALL_EPSILON;
        self.head = clamped;
        self.trail_joint();

        if hit_wall {
            // Back away: the tail end leads from now on.
            core::mem::swap(&mut self.head, &mut self.joint);
            self.head_angle = (self.head - self.joint).angle();
        }

        let concentration = source.concentration_at(self.head);
        let lost_gradient = self
            .last_concentration
            .is_some_and(|previous| previous - concentration > self.params.turn_threshold);
        self.last_concentration = Some(concentration);

        if hit_wall || lost_gradient {
            self.start_cast(concentration);
        }
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn start_cast(&mut self, concentration: f64) {
        let side = if self.rng.random_bool(0.5) {
            BehaviorState::CastLeft
        } else {
            BehaviorState::CastRight
        };
        let axis = (self.head - self.joint).angle();
        self.cast = Some(Cast {
            axis,
            offset: 0.0,
            reference: concentration,
            best_angle: axis,
            best_concentration: concentration,
            flips: 0,
        });
        self.set_behavior(side);
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn cast(&mut self, dt: f64, arena: &dyn Arena, source: &OdorSource) {
        let Some(mut cast) = self.cast else {
            self.set_behavior(BehaviorState::Run);
            return;
        };

        let direction: f64 = if self.behavior == BehaviorState::CastLeft {
            1.0
        } else {
            -1.0
        };
        let amplitude = self.params.cast_amplitude;
        cast.offset = direction
            .mul_add(self.params.cast_speed * dt, cast.offset)
            .clamp(-amplitude, amplitude);
        self.head_angle = cast.axis + cast.offset;
        self.head =
            arena.clamp(self.joint + Point2::from_polar(self.params.body_length, self.head_angle));

        let concentration = source.concentration_at(self.head);
        if concentration > cast.best_concentration {
            cast.best_concentration = concentration;
            cast.best_angle = self.head_angle;
        }

        if concentration > cast.reference + self.params.turn_threshold {
            self.finish_cast(self.head_angle, concentration);
            return;
        }

        if cast.offset.abs() >= amplitude {
            cast.flips = cast.flips.saturating_add(1);
            if cast.flips >= FULL_SWEEP_FLIPS {
                self.finish_cast(cast.best_angle, concentration);
                return;
            }
            self.set_behavior(self.behavior.flipped());
        }
        self.cast = Some(cast);
    }

    fn finish_cast(&mut self, heading: f64, concentration: f64) {
        self.head_angle = heading;
        self.cast = None;
        self.last_concentration = Some(concentration);
        self.set_behavior(BehaviorState::Run);
    }
}

impl SimulationObject for ChemotaxisLarva {
    fn update(&mut self, ctx: &mut StepContext<'_>) -> Result<(), ModelError> {
        let dt = ctx.dt();
        let arena = ctx.arena()?;
        let source = *ctx.source();
        let previous_head = self.head;

        match self.behavior {
            BehaviorState::Run => self.run(dt, arena, &source),
            BehaviorState::CastLeft | BehaviorState::CastRight => self.cast(dt, arena, &source),
            BehaviorState::Stop => {}
        }

        let arrived = self.head.distance(source.position) <= self.params.body_length / 2.0;
        if arrived && self.behavior != BehaviorState::Stop {
            self.cast = None;
            self.set_behavior(BehaviorState::Stop);
        }

        self.velocity = previous_head.distance(self.head) / dt;
        ctx.notify(self.report())
    }
}

impl Larva for ChemotaxisLarva {
    fn report(&self) -> LarvaReport {
        LarvaReport {
            behavior: self.behavior,
            head: self.head,
            joint: self.joint,
            velocity: self.velocity,
            head_angle: self.head_angle,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use larvasim_core::SimulationModel;
    use larvasim_types::StateNotification;

    use super::*;
    use crate::arena::RectArena;

    fn make_model(source: Point2) -> (SimulationModel, Receiver<StateNotification>) {
        let mut model = SimulationModel::new(0.1, OdorSource::new(source, 10.0, 5.0)).unwrap();
        model
            .register_arena(RectArena::centered(40.0, 40.0).unwrap())
            .unwrap();
        let (tx, rx) = mpsc::channel::<StateNotification>();
        model.attach(tx);
        (model, rx)
    }

    fn make_larva(head: Point2, head_angle: f64) -> ChemotaxisLarva {
        ChemotaxisLarva::new(head, head_angle, LarvaParams::default(), 7).unwrap()
    }

    #[test]
    fn default_params_are_valid() {
        assert!(LarvaParams::default().validate().is_ok());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = LarvaParams {
            body_length: 0.0,
            ..LarvaParams::default()
        };
        assert!(ChemotaxisLarva::new(Point2::ORIGIN, 0.0, params, 1).is_err());
        let params = LarvaParams {
            cast_amplitude: 4.0,
            ..LarvaParams::default()
        };
        assert!(params.validate().is_err());
        let nan_head = Point2::new(f64::NAN, 0.0);
        let bad_pose = ChemotaxisLarva::new(nan_head, 0.0, LarvaParams::default(), 1);
        assert!(bad_pose.is_err());
    }

    #[test]
    fn runs_up_the_gradient() {
        let (mut model, rx) = make_model(Point2::new(10.0, 0.0));
        let id = model.register_larva(make_larva(Point2::ORIGIN, 0.0));

        for _ in 0..10 {
            model.step().unwrap();
        }

        let seen: Vec<StateNotification> = rx.try_iter().collect();
        assert_eq!(seen.len(), 10);
        assert!(seen.iter().all(|n| n.behavior == BehaviorState::Run));
        assert!(seen.iter().all(|n| n.larva == Some(id)));
        assert!(seen.iter().all(|n| (n.velocity - 1.0).abs() < 1e-9));

        let report = model.larva(id).unwrap().report();
        assert!((report.head.x - 1.0).abs() < 1e-9);
        assert!((report.head.distance(report.joint) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn losing_the_gradient_starts_a_cast_then_recovers() {
        let (mut model, rx) = make_model(Point2::ORIGIN);
        let _ = model.register_larva(make_larva(Point2::new(3.0, 0.0), 0.0));

        for _ in 0..3 {
            model.step().unwrap();
        }

        let behaviors: Vec<BehaviorState> = rx.try_iter().map(|n| n.behavior).collect();
        assert_eq!(behaviors.len(), 3);
        assert_eq!(behaviors.first(), Some(&BehaviorState::Run));
        assert!(behaviors.get(1).is_some_and(|b| b.is_casting()));
        assert_eq!(behaviors.get(2), Some(&BehaviorState::Run));
    }

    #[test]
    fn wall_hit_turns_around_and_casts() {
        let mut model =
            SimulationModel::new(0.1, OdorSource::new(Point2::new(10.0, 0.0), 10.0, 5.0)).unwrap();
        model
            .register_arena(RectArena::centered(4.0, 4.0).unwrap())
            .unwrap();
        let id = model.register_larva(make_larva(Point2::new(1.95, 0.0), 0.0));

        model.step().unwrap();

        let larva = model.larva(id).unwrap().report();
        assert!(larva.behavior.is_casting());
        assert!(model.arena().unwrap().contains(larva.head));
        assert!(larva.head.x < 2.0);
    }

    #[test]
    fn stops_at_the_source() {
        let (mut model, rx) = make_model(Point2::new(5.0, 0.0));
        let _ = model.register_larva(make_larva(Point2::new(4.8, 0.0), 0.0));

        model.step().unwrap();
        model.step().unwrap();

        let seen: Vec<StateNotification> = rx.try_iter().collect();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|n| n.behavior == BehaviorState::Stop));
        let last = seen.last().unwrap();
        assert!(last.velocity.abs() < 1e-12);
    }

    #[test]
    fn needs_an_arena() {
        let mut model = SimulationModel::new(0.1, OdorSource::default()).unwrap();
        let _ = model.register_larva(make_larva(Point2::ORIGIN, 0.0));
        assert!(matches!(model.step(), Err(ModelError::MissingArena)));
    }
}
