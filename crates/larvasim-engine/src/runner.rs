//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`SimulationModel::step`] until one of:
//!
//! - **Step bound**: `max_steps` steps have completed,
//! - **Shutdown**: the supplied shutdown future resolves (Ctrl-C in the
//!   binary),
//! - **Failure**: a step returns an error, which is propagated unchanged.
//!
//! Steps can be paced in real time with a fixed interval. Observers are
//! flushed once the loop ends cleanly.

use std::future::Future;
use std::time::Duration;

use larvasim_core::{ModelError, SimulationModel, StepReport};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::RunConfig;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step (or the final observer flush) failed.
    #[error("step error: {source}")]
    Step {
        /// The underlying model error.
        #[from]
        source: ModelError,
    },
}

/// Why the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured number of steps completed.
    MaxSteps,
    /// The shutdown signal fired.
    Shutdown,
}

/// Limits and pacing for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunBounds {
    /// Stop after this many steps; `None` runs until shutdown.
    pub max_steps: Option<u64>,
    /// Real-time delay between steps; `None` runs flat out.
    pub step_interval: Option<Duration>,
}

impl From<&RunConfig> for RunBounds {
    fn from(config: &RunConfig) -> Self {
        Self {
            max_steps: (config.max_steps > 0).then_some(config.max_steps),
            step_interval: (config.step_interval_ms > 0)
                .then(|| Duration::from_millis(config.step_interval_ms)),
        }
    }
}

/// Result of the simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// Steps completed by this run.
    pub steps: u64,
    /// Model time when the run ended.
    pub final_time: f64,
    /// Report of the last completed step, if any.
    pub last_step: Option<StepReport>,
}

/// Run the model until the step bound is reached or `shutdown` resolves.
///
/// Shutdown is checked before every step, so a signal that is already
/// pending stops the run before the next step starts. A step never gets
/// interrupted halfway.
///
/// # Errors
///
/// Returns [`RunnerError::Step`] with the first step error, or with the
/// error raised while flushing observers at the end.
pub async fn run_simulation<F>(
    model: &mut SimulationModel,
    bounds: &RunBounds,
    shutdown: F,
) -> Result<RunSummary, RunnerError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut pacer = bounds.step_interval.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    info!(
        start_time = model.time(),
        dt = model.dt(),
        larvae = model.larva_count(),
        observers = model.observer_count(),
        max_steps = ?bounds.max_steps,
        step_interval = ?bounds.step_interval,
        "Simulation loop starting"
    );

    let mut steps: u64 = 0;
    let mut last_step = None;

    let end_reason = loop {
        if bounds.max_steps.is_some_and(|max| steps >= max) {
            break EndReason::MaxSteps;
        }

        tokio::select! {
            biased;
            () = &mut shutdown => break EndReason::Shutdown,
            () = pace(pacer.as_mut()) => {}
        }

        last_step = Some(model.step()?);
        steps = steps.saturating_add(1);
    };

    model.flush_observers()?;

    Ok(RunSummary {
        end_reason,
        steps,
        final_time: model.time(),
        last_step,
    })
}

/// Wait for the next pacing tick, or just yield when unpaced so the
/// shutdown future gets polled between steps.
async fn pace(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => tokio::task::yield_now().await,
    }
}

/// Log the end of a run.
pub fn log_simulation_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        steps = summary.steps,
        final_time = summary.final_time,
        "Simulation ended"
    );

    if let Some(ref report) = summary.last_step {
        info!(
            time = report.time,
            objects_updated = report.objects_updated,
            notifications = report.notifications,
            "Final step summary"
        );
    } else {
        warn!("Simulation ended with no steps executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::sync::mpsc;

    use larvasim_types::{OdorSource, Point2, StateNotification};
    use larvasim_world::{ChemotaxisLarva, LarvaParams, RectArena};

    use super::*;

    fn make_model(larvae: usize) -> SimulationModel {
        let mut model = SimulationModel::new(0.1, OdorSource::default()).unwrap();
        model
            .register_arena(RectArena::centered(40.0, 40.0).unwrap())
            .unwrap();
        for i in 0..larvae {
            let seed = u64::try_from(i).unwrap();
            let head = Point2::new(10.0, 0.0);
            let params = LarvaParams::default();
            let larva = ChemotaxisLarva::new(head, 0.0, params, seed).unwrap();
            model.register_larva(larva);
        }
        model
    }

    const fn bounded(max_steps: u64) -> RunBounds {
        RunBounds {
            max_steps: Some(max_steps),
            step_interval: None,
        }
    }

    #[test]
    fn bounds_from_config() {
        let bounds = RunBounds::from(&RunConfig {
            max_steps: 0,
            step_interval_ms: 0,
        });
        assert_eq!(bounds, RunBounds::default());

        let bounds = RunBounds::from(&RunConfig {
            max_steps: 5,
            step_interval_ms: 20,
        });
        assert_eq!(bounds.max_steps, Some(5));
        assert_eq!(bounds.step_interval, Some(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn stops_after_max_steps() {
        let mut model = make_model(2);
        let (tx, rx) = mpsc::channel::<StateNotification>();
        model.attach(tx);

        let summary = run_simulation(&mut model, &bounded(10), std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::MaxSteps);
        assert_eq!(summary.steps, 10);
        assert_eq!(model.steps(), 10);
        assert!((summary.final_time - 1.0).abs() < 1e-12);
        assert_eq!(summary.last_step.unwrap().notifications, 2);
        assert_eq!(rx.try_iter().count(), 20);
    }

    #[tokio::test]
    async fn pending_shutdown_stops_before_first_step() {
        let mut model = make_model(1);
        let summary = run_simulation(&mut model, &bounded(10), std::future::ready(()))
            .await
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::Shutdown);
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.final_time, 0.0);
        assert!(summary.last_step.is_none());
    }

    #[tokio::test]
    async fn unbounded_run_ends_on_shutdown() {
        let mut model = make_model(1);
        let shutdown = tokio::time::sleep(Duration::from_millis(20));
        let summary = run_simulation(&mut model, &RunBounds::default(), shutdown)
            .await
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::Shutdown);
        assert_eq!(summary.steps, model.steps());
    }

    #[tokio::test(start_paused = true)]
    async fn paced_run_waits_between_steps() {
        let mut model = make_model(1);
        let bounds = RunBounds {
            max_steps: Some(3),
            step_interval: Some(Duration::from_millis(100)),
        };
        let started = tokio::time::Instant::now();
        let summary = run_simulation(&mut model, &bounds, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.steps, 3);
        // The first tick fires immediately.
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn step_error_propagates() {
        let mut model = SimulationModel::new(0.1, OdorSource::default()).unwrap();
        let head = Point2::new(1.0, 1.0);
        let larva = ChemotaxisLarva::new(head, 0.0, LarvaParams::default(), 1).unwrap();
        model.register_larva(larva);

        let result = run_simulation(&mut model, &bounded(5), std::future::pending()).await;
        assert!(matches!(
            result,
            Err(RunnerError::Step {
                source: ModelError::MissingArena
            })
        ));
        assert_eq!(model.steps(), 0);
    }
}
