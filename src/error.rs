// src/error.rs

//! Unified error handling for the stats notifier.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required configuration missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted snapshot exists but cannot be read back
    #[error("Corrupt snapshot at {path}: {message}")]
    CorruptState { path: String, message: String },

    /// Catalog request answered with an unusable status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Catalog body did not have the expected shape
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Payload serialization or encryption failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a corrupt-state error for the snapshot at `path`.
    pub fn corrupt_state(path: &Path, message: impl fmt::Display) -> Self {
        Self::CorruptState {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    /// Create a data format error.
    pub fn data_format(message: impl Into<String>) -> Self {
        Self::DataFormat(message.into())
    }

    /// Create an encoding error.
    pub fn encoding(message: impl fmt::Display) -> Self {
        Self::Encoding(message.to_string())
    }

    /// Whether this error belongs to the catalog fetch step.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::DataFormat(_) | Self::Http(_))
    }
}
