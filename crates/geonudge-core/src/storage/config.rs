//! TOML-based application configuration.
//!
//! Stores engine tuning and the classifier keyword rules:
//! - Trigger/nearby lookup radii
//! - Category cooldown and the server-assigned per-task cooldown default
//! - Batch size cap and recommended client poll interval
//! - Classifier rules (ordered, first match wins)
//!
//! Configuration is stored at `~/.config/geonudge/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::classify::ClassifierRules;
use crate::engine::cooldown::CooldownPolicy;
use crate::engine::EngineConfig;
use crate::error::ConfigError;

/// Engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    /// Radius for trigger-time proximity queries, meters.
    #[serde(default = "default_trigger_radius_m")]
    pub trigger_radius_m: f64,
    /// Radius for the nearby-places listing, meters.
    #[serde(default = "default_nearby_radius_m")]
    pub nearby_radius_m: f64,
    /// Minimum gap between two fires of the same category, minutes.
    #[serde(default = "default_category_cooldown_minutes")]
    pub category_cooldown_minutes: i64,
    /// Server-assigned per-task cooldown for new tasks, minutes.
    #[serde(default = "default_task_cooldown_minutes")]
    pub default_task_cooldown_minutes: i64,
    /// Maximum tasks emitted per batch; `count` still reports the total.
    #[serde(default = "default_batch_cap")]
    pub batch_cap: usize,
    /// Recommended location poll interval for clients, seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

// Default functions
fn default_trigger_radius_m() -> f64 {
    1000.0
}
fn default_nearby_radius_m() -> f64 {
    5000.0
}
fn default_category_cooldown_minutes() -> i64 {
    30
}
fn default_task_cooldown_minutes() -> i64 {
    60
}
fn default_batch_cap() -> usize {
    5
}
fn default_poll_interval_secs() -> u64 {
    120
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            trigger_radius_m: default_trigger_radius_m(),
            nearby_radius_m: default_nearby_radius_m(),
            category_cooldown_minutes: default_category_cooldown_minutes(),
            default_task_cooldown_minutes: default_task_cooldown_minutes(),
            batch_cap: default_batch_cap(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/geonudge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub classifier: ClassifierRules,
}

impl Config {
    /// Path of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/geonudge"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Engine configuration derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            trigger_radius_m: self.engine.trigger_radius_m,
            batch_cap: self.engine.batch_cap,
            cooldown: CooldownPolicy {
                category_cooldown_minutes: self.engine.category_cooldown_minutes,
            },
        }
    }
}
