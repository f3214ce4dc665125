//! # Blessing Common Library
//!
//! Shared code for the blessing harvester workspace:
//! - Error and result types
//! - TOML configuration loading and root folder resolution
//! - Atomic file writes for persisted documents

pub mod config;
pub mod error;
pub mod fs;

pub use error::{Error, Result};
