//! Configuration management for period-tracker

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::analytics::FALLBACK_CYCLE_LENGTH;
use crate::error::{Error, Result};
use crate::types::DayCount;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Storage settings
    pub storage: StorageConfig,

    /// Auto-prediction and statistics tunables
    pub prediction: PredictionConfig,

    /// Recurring callback settings
    pub schedule: ScheduleConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Data directory (default: ~/.local/share/period-tracker)
    pub data_dir: Option<PathBuf>,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the key-value blobs (default: data directory)
    pub path: Option<String>,
}

/// Tunables for auto-prediction, the picker and cycle statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Days selected when a single tap auto-expands into a period
    pub default_period_length: i64,

    /// Minimum days from a tapped day forward to the next period's start
    pub min_gap_to_next: i64,

    /// Minimum days from the previous period's end to a tapped day
    pub min_gap_from_previous: i64,

    /// Cycle length assumed when fewer than two periods are recorded
    pub fallback_cycle_length: i64,

    /// Days after today that are still tappable (0 = nothing after today)
    pub far_future_after_days: i64,

    /// Whether to predict the next period at all
    pub show_prediction: bool,

    /// How far ahead of today a predicted period may start
    pub prediction_days_ahead: i64,
}

/// Recurring callback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// How often to check whether the date rolled over (e.g. "60s", "1m")
    pub rollover_check_interval: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: None,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_period_length: 6,
            min_gap_to_next: 10,
            min_gap_from_previous: 6,
            fallback_cycle_length: FALLBACK_CYCLE_LENGTH.get(),
            far_future_after_days: 0,
            show_prediction: true,
            prediction_days_ahead: 60,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rollover_check_interval: "60s".to_string(),
        }
    }
}

impl PredictionConfig {
    /// Default period length as a day count
    #[must_use]
    pub const fn default_period_length(&self) -> DayCount {
        DayCount::new(self.default_period_length)
    }

    /// Fallback cycle length as a day count
    #[must_use]
    pub const fn fallback_cycle_length(&self) -> DayCount {
        DayCount::new(self.fallback_cycle_length)
    }
}

impl ScheduleConfig {
    /// Parse the rollover check interval.
    pub fn rollover_interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.rollover_check_interval).map_err(|e| {
            Error::config(format!(
                "invalid rollover_check_interval '{}': {e}",
                self.rollover_check_interval
            ))
        })
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join("period-tracker").join("config.toml"))
    }

    /// Get the data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.general.data_dir {
            Ok(dir.clone())
        } else {
            let data_dir = dirs::data_local_dir()
                .ok_or_else(|| Error::config("Could not determine data directory"))?;
            Ok(data_dir.join("period-tracker"))
        }
    }

    /// Get the directory the key-value store writes into
    pub fn storage_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.storage.path {
            return Ok(PathBuf::from(path));
        }
        Ok(self.data_dir()?.join("store"))
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        let p = &self.prediction;

        if !(1..=31).contains(&p.default_period_length) {
            return Err(Error::config(format!(
                "default_period_length must be between 1 and 31, got {}",
                p.default_period_length
            )));
        }

        if p.min_gap_to_next < 1 || p.min_gap_from_previous < 1 {
            return Err(Error::config(format!(
                "gap thresholds must be positive, got min_gap_to_next={} min_gap_from_previous={}",
                p.min_gap_to_next, p.min_gap_from_previous
            )));
        }

        if !(1..=120).contains(&p.fallback_cycle_length) {
            return Err(Error::config(format!(
                "fallback_cycle_length must be between 1 and 120, got {}",
                p.fallback_cycle_length
            )));
        }

        if p.far_future_after_days < 0 || p.prediction_days_ahead < 0 {
            return Err(Error::config(format!(
                "far_future_after_days and prediction_days_ahead must not be negative, got {} and {}",
                p.far_future_after_days, p.prediction_days_ahead
            )));
        }

        if self.schedule.rollover_interval()?.is_zero() {
            return Err(Error::config("rollover_check_interval must be non-zero"));
        }

        // Validate log_level is a known level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        Ok(())
    }
}
