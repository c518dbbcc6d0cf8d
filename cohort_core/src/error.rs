//! Error types for the cohort_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cohort_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Scenario validation error
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// Malformed transition or rate matrix
    #[error("Matrix error: {0}")]
    Matrix(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
