//! Configuration file support for Routinely.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/routinely/config.toml`.
//! The `[policy]` section holds the product tuning constants (default rest,
//! seed targets for new exercises, metric step sizes) that the engine treats
//! as externally configurable rather than hard-coded.

use crate::types::Metric;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Engine tuning policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Rest seeded onto the final member of a new superset, in seconds
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,

    /// Advisory per-rep duration used when a set has no Duration target
    #[serde(default = "default_seconds_per_rep")]
    pub seconds_per_rep: u32,

    /// Advisory fallback when a set has neither Duration nor Reps targets
    #[serde(default = "default_set_seconds")]
    pub default_set_seconds: u32,

    /// Reps seeded onto a freshly inserted strength exercise
    #[serde(default = "default_strength_reps")]
    pub strength_default_reps: u32,

    /// Duration (seconds) seeded onto a freshly inserted cardio exercise
    #[serde(default = "default_cardio_duration")]
    pub cardio_default_duration_seconds: u32,

    #[serde(default)]
    pub steps: StepConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_rest_seconds: default_rest_seconds(),
            seconds_per_rep: default_seconds_per_rep(),
            default_set_seconds: default_set_seconds(),
            strength_default_reps: default_strength_reps(),
            cardio_default_duration_seconds: default_cardio_duration(),
            steps: StepConfig::default(),
        }
    }
}

/// Step sizes used when nudging numeric targets up or down
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepConfig {
    #[serde(default = "default_reps_step")]
    pub reps: f64,
    #[serde(default = "default_weight_step")]
    pub weight: f64,
    #[serde(default = "default_duration_step")]
    pub duration: f64,
    #[serde(default = "default_distance_step")]
    pub distance: f64,
    #[serde(default = "default_rest_step")]
    pub rest: f64,
    #[serde(default = "default_tempo_step")]
    pub tempo: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            reps: default_reps_step(),
            weight: default_weight_step(),
            duration: default_duration_step(),
            distance: default_distance_step(),
            rest: default_rest_step(),
            tempo: default_tempo_step(),
        }
    }
}

impl StepConfig {
    /// Step size for one metric
    pub fn for_metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Reps => self.reps,
            Metric::Weight => self.weight,
            Metric::Duration => self.duration,
            Metric::Distance => self.distance,
            Metric::Rest => self.rest,
            Metric::Tempo => self.tempo,
        }
    }
}

/// Edit history configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of retained history entries
    #[serde(default = "default_history_max")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_history_max(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("routinely")
}

fn default_rest_seconds() -> u32 {
    60
}

fn default_seconds_per_rep() -> u32 {
    3
}

fn default_set_seconds() -> u32 {
    30
}

fn default_strength_reps() -> u32 {
    10
}

fn default_cardio_duration() -> u32 {
    600
}

fn default_reps_step() -> f64 {
    1.0
}

fn default_weight_step() -> f64 {
    2.5
}

fn default_duration_step() -> f64 {
    30.0
}

fn default_distance_step() -> f64 {
    100.0
}

fn default_rest_step() -> f64 {
    15.0
}

fn default_tempo_step() -> f64 {
    1.0
}

fn default_history_max() -> usize {
    50
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("routinely").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
