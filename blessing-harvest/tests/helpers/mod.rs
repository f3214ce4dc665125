//! Test Helper Utilities
//!
//! Shared utilities for testing blessing-harvest
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::{distinct_blessing, fast_config, test_orchestrator, TestHarness};
pub use mocks::{CancellingSearch, LineExtractor, MockFetcher, MockResponse, MockSearch};
