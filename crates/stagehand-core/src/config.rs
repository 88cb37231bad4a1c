//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `stagehand-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads and validates the
//! file. All fields have sensible defaults, so a missing file or a partial
//! file is never an error at this layer.

use std::path::Path;

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

/// Top-level core configuration.
///
/// Mirrors the structure of `stagehand-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoreConfig {
    /// World-level settings (name, seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// Frame timing settings.
    #[serde(default)]
    pub frame: FrameConfig,

    /// Statistics sampling settings.
    #[serde(default)]
    pub statistics: StatsConfig,

    /// Run boundary settings for the host loop.
    #[serde(default)]
    pub bounds: BoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible demo spawning.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Frame timing configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameConfig {
    /// Real-time milliseconds per frame the host loop targets.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Ratio of simulated to real time.
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            time_scale: default_time_scale(),
        }
    }
}

/// Statistics sampling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatsConfig {
    /// Whether frame statistics are sampled at all.
    #[serde(default)]
    pub enabled: bool,

    /// Number of frames between samples.
    #[serde(default = "default_stats_interval")]
    pub interval_frames: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_frames: default_stats_interval(),
        }
    }
}

impl StatsConfig {
    /// The sampling interval in the form the frame driver consumes:
    /// `None` when disabled.
    pub const fn sample_interval(&self) -> Option<u64> {
        if self.enabled && self.interval_frames > 0 {
            Some(self.interval_frames)
        } else {
            None
        }
    }
}

/// Run boundary configuration for the host loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoundsConfig {
    /// Stop after this many frames. Zero means unbounded.
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            max_frames: default_max_frames(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_world_name() -> String {
    "stagehand".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_time_scale() -> f32 {
    1.0
}

const fn default_stats_interval() -> u64 {
    60
}

const fn default_max_frames() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = CoreConfig::parse("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.frame.frame_interval_ms, 16);
        assert!((config.frame.time_scale - 1.0).abs() < f32::EPSILON);
        assert!(!config.statistics.enabled);
        assert_eq!(config.bounds.max_frames, 600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = r"
world:
  name: harbor-test
frame:
  time_scale: 2.0
statistics:
  enabled: true
  interval_frames: 10
";
        let config = CoreConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "harbor-test");
        assert_eq!(config.world.seed, 42);
        assert!((config.frame.time_scale - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.frame.frame_interval_ms, 16);
        assert_eq!(config.statistics.sample_interval(), Some(10));
    }

    #[test]
    fn disabled_statistics_yield_no_interval() {
        let config = CoreConfig::default();
        assert_eq!(config.statistics.sample_interval(), None);

        let yaml = "statistics:\n  enabled: true\n  interval_frames: 0\n";
        let config = CoreConfig::parse(yaml).unwrap();
        assert_eq!(config.statistics.sample_interval(), None);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = CoreConfig::parse("frame: [not, a, map]");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = CoreConfig::from_file(Path::new("/nonexistent/stagehand-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
