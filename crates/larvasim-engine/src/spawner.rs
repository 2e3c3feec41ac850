//! Larva spawner for seeding the simulation.
//!
//! At startup the spawner places `count` larvae uniformly inside the spawn
//! disc, clamps each head into the arena, and gives each larva a random
//! heading and its own generator seed. Everything is drawn from one seeded
//! generator, so a given configuration always produces the same population.

use std::f64::consts::TAU;

use larvasim_core::SimulationModel;
use larvasim_types::{LarvaId, Point2};
use larvasim_world::ChemotaxisLarva;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::LarvaeConfig;
use crate::error::EngineError;

/// Spawn the configured larvae into `model` and return their IDs in
/// registration order.
///
/// The arena must already be registered.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] for a bad spawn disc,
/// [`EngineError::World`] for invalid larva parameters, or
/// [`EngineError::Model`] if no arena is registered.
#[allow(clippy::arithmetic_side_effects)]
pub fn spawn_larvae(
    model: &mut SimulationModel,
    config: &LarvaeConfig,
) -> Result<Vec<LarvaId>, EngineError> {
    let center = Point2::from(config.spawn_center);
    if !center.is_finite() || !config.spawn_radius.is_finite() || config.spawn_radius < 0.0 {
        return Err(EngineError::Spawner {
            message: format!(
                "spawn disc needs a finite center and radius >= 0, got {center:?} and {}",
                config.spawn_radius
            ),
        });
    }
    config.params.validate()?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut ids = Vec::new();

    for _ in 0..config.count {
        let radius = config.spawn_radius * rng.random::<f64>().sqrt();
        let bearing = rng.random_range(0.0..TAU);
        let head_angle = rng.random_range(0.0..TAU);
        let larva_seed = rng.random::<u64>();

        let offset = Point2::from_polar(radius, bearing);
        let head = model.arena()?.clamp(center + offset);
        let larva = ChemotaxisLarva::new(head, head_angle, config.params, larva_seed)?;
        let id = model.register_larva(larva);

        debug!(
            larva = %id,
            head_x = head.x,
            head_y = head.y,
            head_angle,
            "Larva spawned"
        );
        ids.push(id);
    }

    info!(
        count = ids.len(),
        seed = config.seed,
        spawn_radius = config.spawn_radius,
        "Larvae spawned"
    );

    Ok(ids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larvasim_core::ModelError;
    use larvasim_types::OdorSource;
    use larvasim_world::RectArena;

    use super::*;

    fn make_model() -> SimulationModel {
        let mut model = SimulationModel::new(0.1, OdorSource::default()).unwrap();
        model
            .register_arena(RectArena::centered(40.0, 40.0).unwrap())
            .unwrap();
        model
    }

    fn heads(model: &SimulationModel) -> Vec<Point2> {
        model
            .larvae()
            .map(|(_, larva)| larva.report().head)
            .collect()
    }

    #[test]
    fn spawns_requested_count_inside_arena() {
        let mut model = make_model();
        let config = LarvaeConfig {
            count: 12,
            ..LarvaeConfig::default()
        };
        let ids = spawn_larvae(&mut model, &config).unwrap();

        assert_eq!(ids.len(), 12);
        assert_eq!(model.larva_count(), 12);
        let arena = model.arena().unwrap();
        for head in heads(&model) {
            assert!(arena.contains(head));
        }
    }

    #[test]
    fn heads_are_clamped_into_the_arena() {
        let mut model = make_model();
        let config = LarvaeConfig {
            count: 20,
            spawn_center: [30.0, 0.0],
            spawn_radius: 5.0,
            ..LarvaeConfig::default()
        };
        spawn_larvae(&mut model, &config).unwrap();

        let arena = model.arena().unwrap();
        for head in heads(&model) {
            assert!(arena.contains(head));
            assert!(head.x <= 20.0);
        }
    }

    #[test]
    fn same_seed_same_population() {
        let config = LarvaeConfig::default();
        let mut first = make_model();
        let mut second = make_model();
        spawn_larvae(&mut first, &config).unwrap();
        spawn_larvae(&mut second, &config).unwrap();
        assert_eq!(heads(&first), heads(&second));

        let mut third = make_model();
        let other = LarvaeConfig {
            seed: 43,
            ..LarvaeConfig::default()
        };
        spawn_larvae(&mut third, &other).unwrap();
        assert_ne!(heads(&first), heads(&third));
    }

    #[test]
    fn zero_count_spawns_nothing() {
        let mut model = make_model();
        let config = LarvaeConfig {
            count: 0,
            ..LarvaeConfig::default()
        };
        assert!(spawn_larvae(&mut model, &config).unwrap().is_empty());
        assert_eq!(model.larva_count(), 0);
    }

    #[test]
    fn needs_an_arena() {
        let mut model = SimulationModel::new(0.1, OdorSource::default()).unwrap();
        let result = spawn_larvae(&mut model, &LarvaeConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::Model {
                source: ModelError::MissingArena
            })
        ));
        assert_eq!(model.larva_count(), 0);
    }

    #[test]
    fn rejects_negative_spawn_radius() {
        let mut model = make_model();
        let config = LarvaeConfig {
            spawn_radius: -1.0,
            ..LarvaeConfig::default()
        };
        assert!(matches!(
            spawn_larvae(&mut model, &config),
            Err(EngineError::Spawner { .. })
        ));
    }
}
