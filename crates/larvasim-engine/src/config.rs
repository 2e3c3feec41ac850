//! Configuration loading and typed config structures for the engine.
//!
//! The configuration lives in `larvasim-config.yaml` by default. Every
//! section and every field is optional; anything left out falls back to
//! the defaults below, so an empty file is a valid configuration.

use std::path::Path;

use larvasim_types::{OdorSource, Point2};
use larvasim_world::{ArenaKind, CircularArena, LarvaParams, RectArena, WorldError};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Time step and odor source.
    #[serde(default)]
    pub model: ModelConfig,

    /// Arena shape and size.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// How many larvae to spawn and how they behave.
    #[serde(default)]
    pub larvae: LarvaeConfig,

    /// Run bounds and pacing.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Notification outputs.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Model-level settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Simulated time per step.
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Simulated time before the first step.
    #[serde(default)]
    pub start_time: f64,

    /// The odor source larvae navigate towards.
    #[serde(default)]
    pub source: SourceConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            start_time: 0.0,
            source: SourceConfig::default(),
        }
    }
}

const fn default_dt() -> f64 {
    0.1
}

/// Odor source settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    /// Source position as `[x, y]`.
    #[serde(default)]
    pub position: [f64; 2],

    /// Peak concentration.
    #[serde(default = "default_strength")]
    pub strength: f64,

    /// Spatial decay scale.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            strength: default_strength(),
            decay_rate: default_decay_rate(),
        }
    }
}

impl SourceConfig {
    /// Build the odor source this section describes.
    pub fn to_odor_source(&self) -> OdorSource {
        OdorSource::new(Point2::from(self.position), self.strength, self.decay_rate)
    }
}

const fn default_strength() -> f64 {
    10.0
}

const fn default_decay_rate() -> f64 {
    5.0
}

/// Arena shape, selected by the `shape` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ArenaConfig {
    /// Axis-aligned rectangle centered on the origin.
    Rectangle {
        /// Extent along x.
        #[serde(default = "default_arena_extent")]
        width: f64,
        /// Extent along y.
        #[serde(default = "default_arena_extent")]
        height: f64,
    },
    /// Disc centered on the origin.
    Circle {
        /// Disc radius.
        #[serde(default = "default_arena_radius")]
        radius: f64,
    },
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::Rectangle {
            width: default_arena_extent(),
            height: default_arena_extent(),
        }
    }
}

impl ArenaConfig {
    /// Build the arena this section describes.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidArena`] for degenerate geometry.
    pub fn build(&self) -> Result<ArenaKind, WorldError> {
        match *self {
            Self::Rectangle { width, height } => Ok(RectArena::centered(width, height)?.into()),
            Self::Circle { radius } => Ok(CircularArena::new(Point2::ORIGIN, radius)?.into()),
        }
    }
}

const fn default_arena_extent() -> f64 {
    40.0
}

const fn default_arena_radius() -> f64 {
    20.0
}

/// Larva spawning settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LarvaeConfig {
    /// Number of larvae to spawn.
    #[serde(default = "default_larva_count")]
    pub count: u32,

    /// Seed for spawn positions, headings, and per-larva generators.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Center of the spawn disc as `[x, y]`.
    #[serde(default = "default_spawn_center")]
    pub spawn_center: [f64; 2],

    /// Radius of the spawn disc.
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f64,

    /// Behavior parameters shared by every spawned larva.
    #[serde(flatten)]
    pub params: LarvaParams,
}

impl Default for LarvaeConfig {
    fn default() -> Self {
        Self {
            count: default_larva_count(),
            seed: default_seed(),
            spawn_center: default_spawn_center(),
            spawn_radius: default_spawn_radius(),
            params: LarvaParams::default(),
        }
    }
}

const fn default_larva_count() -> u32 {
    2
}

const fn default_seed() -> u64 {
    42
}

const fn default_spawn_center() -> [f64; 2] {
    [15.0, 0.0]
}

const fn default_spawn_radius() -> f64 {
    10.0
}

/// Run bounds and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stop after this many steps. Zero means run until interrupted.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Real-time milliseconds between steps. Zero runs flat out.
    #[serde(default)]
    pub step_interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            step_interval_ms: 0,
        }
    }
}

const fn default_max_steps() -> u64 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

/// Where notifications go besides the model's own observers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Write every notification as one JSON line to this file.
    #[serde(default)]
    pub jsonl_path: Option<String>,

    /// Log every notification at `debug` level.
    #[serde(default = "default_log_notifications")]
    pub log_notifications: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jsonl_path: None,
            log_notifications: default_log_notifications(),
        }
    }
}

const fn default_log_notifications() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.model.dt, 0.1);
        assert_eq!(config.model.start_time, 0.0);
        assert_eq!(config.model.source.position, [0.0, 0.0]);
        assert_eq!(config.model.source.strength, 10.0);
        assert_eq!(config.model.source.decay_rate, 5.0);
        assert_eq!(
            config.arena,
            ArenaConfig::Rectangle {
                width: 40.0,
                height: 40.0
            }
        );
        assert_eq!(config.larvae.count, 2);
        assert_eq!(config.larvae.seed, 42);
        assert_eq!(config.larvae.spawn_radius, 10.0);
        assert_eq!(config.larvae.params, LarvaParams::default());
        assert_eq!(config.run.max_steps, 1000);
        assert_eq!(config.run.step_interval_ms, 0);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.output.jsonl_path, None);
        assert!(config.output.log_notifications);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
model:
  dt: 0.05
  start_time: 2.0
  source:
    position: [3.0, -4.0]
    strength: 8.0
    decay_rate: 2.5
arena:
  shape: circle
  radius: 12.0
larvae:
  count: 5
  seed: 7
  spawn_center: [1.0, 1.0]
  spawn_radius: 3.0
  run_speed: 1.5
  cast_amplitude: 0.5
run:
  max_steps: 200
  step_interval_ms: 10
logging:
  level: debug
  json: true
output:
  jsonl_path: out.jsonl
  log_notifications: false
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.model.dt, 0.05);
        assert_eq!(config.model.start_time, 2.0);
        assert_eq!(
            config.model.source.to_odor_source(),
            OdorSource::new(Point2::new(3.0, -4.0), 8.0, 2.5)
        );
        assert_eq!(config.arena, ArenaConfig::Circle { radius: 12.0 });
        assert_eq!(config.larvae.count, 5);
        assert_eq!(config.larvae.seed, 7);
        assert_eq!(config.larvae.spawn_center, [1.0, 1.0]);
        assert_eq!(config.larvae.params.run_speed, 1.5);
        assert_eq!(config.larvae.params.cast_amplitude, 0.5);
        // Unset larva parameters keep their defaults.
        assert_eq!(config.larvae.params.body_length, 1.0);
        assert_eq!(config.run.max_steps, 200);
        assert_eq!(config.run.step_interval_ms, 10);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.output.jsonl_path.as_deref(), Some("out.jsonl"));
        assert!(!config.output.log_notifications);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("run:\n  max_steps: 3\n").unwrap();
        assert_eq!(config.run.max_steps, 3);
        assert_eq!(config.model.dt, 0.1);
        assert_eq!(config.larvae.count, 2);
    }

    #[test]
    fn rectangle_fields_default_individually() {
        let yaml = "arena:\n  shape: rectangle\n  width: 10.0\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(
            config.arena,
            ArenaConfig::Rectangle {
                width: 10.0,
                height: 40.0
            }
        );
    }

    #[test]
    fn arena_config_builds_matching_shape() {
        let rect = ArenaConfig::default().build().unwrap();
        assert!(matches!(rect, ArenaKind::Rect(_)));
        let circle = ArenaConfig::Circle { radius: 5.0 }.build().unwrap();
        assert!(matches!(circle, ArenaKind::Circle(_)));
        assert!(ArenaConfig::Circle { radius: 0.0 }.build().is_err());
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let result = SimulationConfig::parse("arena:\n  shape: hexagon\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/larvasim-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
