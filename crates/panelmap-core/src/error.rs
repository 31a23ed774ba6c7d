//! Error types for PanelMap

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Load errors
    #[error("No data sources could be loaded (tried: {})", tried.join(", "))]
    NoData { tried: Vec<String> },

    #[error("Source {name} is unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    #[error("Source {name} is not a GeoJSON FeatureCollection: {reason}")]
    InvalidGeoJson { name: String, reason: String },

    #[error("Data directory not found at {path}")]
    DataDirNotFound { path: PathBuf },

    // History errors
    #[error("No feature with identifier '{id}'")]
    FeatureNotFound { id: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
