//! Common error types for the blessing harvester

use thiserror::Error;

/// Common result type for harvester operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across harvester crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
