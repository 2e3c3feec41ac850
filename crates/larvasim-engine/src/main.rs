//! Simulation engine binary for the larva chemotaxis simulation.
//!
//! Loads configuration, builds the model with its arena, larvae, and
//! observers, and runs the step loop until the step bound is reached or
//! the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `larvasim-config.yaml` (or the path given as
//!    the first argument or in `LARVASIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the model from the time step and odor source
//! 4. Register the arena
//! 5. Spawn larvae inside the spawn disc
//! 6. Attach observers
//! 7. Run the simulation loop
//! 8. Log the result

mod config;
mod error;
mod observers;
mod runner;
mod spawner;

use std::path::{Path, PathBuf};

use larvasim_core::SimulationModel;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, SimulationConfig};
use crate::error::EngineError;
use crate::observers::{JsonLinesObserver, TracingObserver};
use crate::runner::RunBounds;

/// Configuration file used when neither an argument nor
/// `LARVASIM_CONFIG` names one.
const DEFAULT_CONFIG_PATH: &str = "larvasim-config.yaml";

/// Environment variable naming the configuration file.
const CONFIG_ENV_VAR: &str = "LARVASIM_CONFIG";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config_path, explicit) = resolve_config_path();
    let loaded = load_config(&config_path, explicit)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("larvasim-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Create the model.
    let source = config.model.source.to_odor_source();
    let mut model = SimulationModel::starting_at(config.model.start_time, config.model.dt, source)
        .map_err(EngineError::from)?;
    info!(
        dt = model.dt(),
        start_time = model.time(),
        source_x = source.position.x,
        source_y = source.position.y,
        strength = source.strength,
        decay_rate = source.decay_rate,
        "Model created"
    );

    // 4. Register the arena.
    let arena = config.arena.build().map_err(EngineError::from)?;
    model.register_arena(arena).map_err(EngineError::from)?;
    info!(arena = ?config.arena, "Arena registered");

    // 5. Spawn larvae.
    let ids = spawner::spawn_larvae(&mut model, &config.larvae)?;

    // 6. Attach observers.
    attach_observers(&mut model, &config)?;
    info!(observers = model.observer_count(), "Observers attached");

    // 7. Run the simulation loop.
    let bounds = RunBounds::from(&config.run);
    let summary = runner::run_simulation(&mut model, &bounds, shutdown_signal())
        .await
        .map_err(EngineError::from)?;

    // 8. Log the result.
    runner::log_simulation_end(&summary);
    for id in ids {
        if let Some(larva) = model.larva(id) {
            let report = larva.report();
            info!(
                larva = %id,
                behavior = %report.behavior,
                head_x = report.head.x,
                head_y = report.head.y,
                distance_to_source = report.head.distance(source.position),
                "Final larva state"
            );
        }
    }

    Ok(())
}

/// Pick the configuration file: first argument, then `LARVASIM_CONFIG`,
/// then the default path. The flag is `true` when the path was given
/// explicitly.
fn resolve_config_path() -> (PathBuf, bool) {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
        .map_or_else(
            || (PathBuf::from(DEFAULT_CONFIG_PATH), false),
            |path| (PathBuf::from(path), true),
        )
}

/// Load the configuration file.
///
/// A missing default file yields `Ok(None)` so the engine runs on
/// defaults. A missing file that was named explicitly is an error.
fn load_config(path: &Path, explicit: bool) -> Result<Option<SimulationConfig>, EngineError> {
    if !explicit && !path.exists() {
        return Ok(None);
    }
    Ok(Some(SimulationConfig::from_file(path)?))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Attach the observers the output section asks for.
fn attach_observers(
    model: &mut SimulationModel,
    config: &SimulationConfig,
) -> Result<(), EngineError> {
    if config.output.log_notifications {
        model.attach(TracingObserver);
    }
    if let Some(ref path) = config.output.jsonl_path {
        let observer =
            JsonLinesObserver::create(Path::new(path)).map_err(|source| EngineError::Output {
                path: path.clone(),
                source,
            })?;
        model.attach(observer);
        info!(path = %path, "Writing notifications as JSON lines");
    }
    Ok(())
}

/// Resolve on Ctrl-C. If the handler cannot be installed the run continues
/// until its step bound.
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
