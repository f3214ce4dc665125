//! Configuration for blessing-harvest
//!
//! One TOML file carries the shared keys (`root_folder`, `[logging]`) and a
//! `[harvest]` table. Every `[harvest]` field has a default, so an absent
//! file or table runs with the stock settings.
//!
//! ```toml
//! root_folder = "/srv/blessings"
//!
//! [logging]
//! level = "info"
//!
//! [harvest]
//! quota_per_bucket = 10
//! similarity_threshold = 0.85
//!
//! [harvest.throttle]
//! fetch_delay = { min_ms = 1000, max_ms = 3000 }
//! ```
//!
//! **Priority for the quota:** ENV (`BLESSING_QUOTA_PER_BUCKET`) → TOML → default

use crate::models::LengthRanges;
use crate::services::classifier::DEFAULT_BRIEF_MAX_CJK;
use crate::services::deduplicator::DEFAULT_SIMILARITY_THRESHOLD;
use crate::services::throttle::DelayRange;
use blessing_common::config::TomlConfig;
use blessing_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable overriding `quota_per_bucket`
pub const QUOTA_ENV: &str = "BLESSING_QUOTA_PER_BUCKET";

/// Whole config file: shared keys plus the `[harvest]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestFileConfig {
    #[serde(flatten)]
    pub base: TomlConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
}

impl HarvestFileConfig {
    /// Load the file (defaults when absent), apply env overrides, validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: HarvestFileConfig = blessing_common::config::load_toml_or_default(path)?;
        config.harvest.apply_env_overrides()?;
        config.harvest.validate()?;
        Ok(config)
    }
}

/// Quality filter bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_cjk: usize,
    pub max_cjk: usize,
    pub min_keyword_hits: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_cjk: 6,
            max_cjk: 700,
            min_keyword_hits: 2,
        }
    }
}

/// Politeness delays and anti-automation backoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Pause between successive page fetches
    pub fetch_delay: DelayRange,
    /// Pause between successive search-result pages
    pub search_delay: DelayRange,
    /// Base wait when blocked, multiplied by the attempt number
    pub backoff: DelayRange,
    /// Attempts per request before a block is treated as a failure
    pub max_retries: u32,
    /// Hard ceiling on outbound requests per minute
    pub requests_per_minute: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            fetch_delay: DelayRange::new(1_000, 3_000),
            search_delay: DelayRange::new(10_000, 20_000),
            backoff: DelayRange::new(120_000, 300_000),
            max_retries: 3,
            requests_per_minute: 30,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

/// Result pages requested per query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub primary_pages: u32,
    pub secondary_pages: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            primary_pages: 3,
            secondary_pages: 2,
        }
    }
}

/// `[harvest]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Capacity of every bucket
    pub quota_per_bucket: usize,
    /// Near-duplicate threshold within a bucket
    pub similarity_threshold: f64,
    /// CJK count at or below which a text is the brief style
    pub brief_max_cjk: usize,
    pub length_ranges: LengthRanges,
    pub quality: QualityConfig,
    pub throttle: ThrottleConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            quota_per_bucket: 10,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            brief_max_cjk: DEFAULT_BRIEF_MAX_CJK,
            length_ranges: LengthRanges::default(),
            quality: QualityConfig::default(),
            throttle: ThrottleConfig::default(),
            http: HttpConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl HarvestConfig {
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(QUOTA_ENV) {
            let quota = raw.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("{} must be a positive integer: {}", QUOTA_ENV, e))
            })?;
            info!(quota, "Bucket quota loaded from environment variable");
            self.quota_per_bucket = quota;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.quota_per_bucket == 0 {
            return Err(Error::Config("quota_per_bucket must be at least 1".to_string()));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.quality.min_cjk > self.quality.max_cjk {
            return Err(Error::Config(format!(
                "quality.min_cjk ({}) exceeds quality.max_cjk ({})",
                self.quality.min_cjk, self.quality.max_cjk
            )));
        }
        self.length_ranges
            .validate()
            .map_err(|e| Error::Config(format!("length_ranges: {}", e)))?;
        for (name, range) in [
            ("fetch_delay", &self.throttle.fetch_delay),
            ("search_delay", &self.throttle.search_delay),
            ("backoff", &self.throttle.backoff),
        ] {
            if range.min_ms > range.max_ms {
                return Err(Error::Config(format!(
                    "throttle.{}: min_ms ({}) exceeds max_ms ({})",
                    name, range.min_ms, range.max_ms
                )));
            }
        }
        if self.throttle.max_retries == 0 {
            return Err(Error::Config("throttle.max_retries must be at least 1".to_string()));
        }
        if self.throttle.requests_per_minute == 0 {
            return Err(Error::Config(
                "throttle.requests_per_minute must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
