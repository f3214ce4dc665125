//! blessing-harvest library interface
//!
//! Exposes the acquisition engine for the binary and integration tests.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod types;

pub use crate::error::{HarvestError, Result};

use crate::config::HarvestConfig;
use crate::services::{
    Collaborators, HtmlExtractor, HttpFetcher, SogouWebSearch, WeixinSearch,
};
use crate::types::PageFetcher;
use std::sync::Arc;

/// Build information captured at compile time
pub const GIT_HASH: &str = env!("GIT_HASH");
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// Production collaborators: HTTP fetcher, HTML extractor, Sogou engines
pub fn http_collaborators(config: &HarvestConfig) -> Result<Collaborators> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(
        HttpFetcher::new(&config.http)
            .map_err(|e| HarvestError::Config(format!("HTTP client: {}", e)))?,
    );
    Ok(Collaborators {
        fetcher: Arc::clone(&fetcher),
        extractor: Arc::new(HtmlExtractor::new()),
        primary_search: Arc::new(WeixinSearch::new(
            Arc::clone(&fetcher),
            config.search.primary_pages,
        )),
        secondary_search: Arc::new(SogouWebSearch::new(fetcher, config.search.secondary_pages)),
    })
}
