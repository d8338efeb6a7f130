mod config;
pub mod place_db;
pub mod task_db;

pub use config::{Config, EngineSection};
pub use place_db::{Place, PlaceDb};
pub use task_db::{PriorityTriggerRate, StatusCounts, TaskDb};

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/geonudge[-dev]/` based on GEONUDGE_ENV.
///
/// Set GEONUDGE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("GEONUDGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("geonudge-dev")
    } else {
        base_dir.join("geonudge")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
