//! Core error types for geonudge-core.
//!
//! This module defines the error hierarchy using thiserror. Store and
//! proximity failures are kept separate because the trigger engine treats
//! them differently: store failures abort a pass, proximity failures
//! degrade to a per-task skip.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for geonudge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Task/place store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Proximity index errors
    #[error("Proximity error: {0}")]
    Proximity(#[from] ProximityError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to prepare the data directory
    #[error("Failed to prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),

    /// A task id was referenced that does not exist
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked by another writer
    #[error("Database is locked")]
    Locked,
}

/// Proximity-index-specific errors.
///
/// The engine never propagates these out of a pass; they are logged and
/// the affected task is treated as "no match".
#[derive(Error, Debug)]
pub enum ProximityError {
    /// Lookup did not complete within the bounded timeout
    #[error("Proximity lookup timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The index backend is unreachable or returned a failure
    #[error("Proximity index unavailable: {0}")]
    Unavailable(String),

    /// The index answered with a payload that cannot be interpreted
    #[error("Invalid proximity response: {0}")]
    InvalidResponse(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Coordinate is NaN or infinite
    #[error("Coordinate '{field}' must be a finite number, got {value}")]
    NonFiniteCoordinate { field: &'static str, value: f64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
