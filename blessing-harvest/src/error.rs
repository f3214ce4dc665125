//! Error types for blessing-harvest
//!
//! Transport failures never surface here: the orchestrator logs them and
//! treats the source as empty. Only persistence and configuration fail a run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// Snapshot or progress document could not be written or read
    #[error("Persistence error: {0}")]
    Persist(#[from] blessing_common::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
