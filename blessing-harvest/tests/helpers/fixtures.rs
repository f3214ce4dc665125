//! Configurations, texts and an orchestrator wired to mocks

use super::mocks::{LineExtractor, MockFetcher};
use blessing_harvest::config::{HarvestConfig, SearchConfig, ThrottleConfig};
use blessing_harvest::services::{
    AcquisitionOrchestrator, Collaborators, DelayRange, QueryBuilder, SeedCatalog, SnapshotStore,
    Throttle,
};
use blessing_harvest::types::SearchEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Defaults with every delay at 1ms and no effective request ceiling
pub fn fast_config(quota: usize) -> HarvestConfig {
    HarvestConfig {
        quota_per_bucket: quota,
        throttle: ThrottleConfig {
            fetch_delay: DelayRange::new(1, 1),
            search_delay: DelayRange::new(1, 1),
            backoff: DelayRange::new(1, 1),
            max_retries: 3,
            requests_per_minute: 1_000_000,
        },
        search: SearchConfig {
            primary_pages: 1,
            secondary_pages: 1,
        },
        ..HarvestConfig::default()
    }
}

/// A blessing that passes the quality filter and shares almost nothing with
/// any other index
///
/// Body characters come from a block of ideographs reserved for `i`, so two
/// different indices never look like near-duplicates. `extra_len` adds CJK
/// characters beyond the 13 of the base text.
pub fn distinct_blessing(i: usize, extra_len: usize) -> String {
    let body: String = (0..8 + extra_len)
        .filter_map(|k| char::from_u32(0x4E00 + (i * 400 + k) as u32))
        .collect();
    format!("祝新年快乐，{}", body)
}

/// Temporary root folder plus the shared mock fetcher
pub struct TestHarness {
    pub dir: TempDir,
    pub fetcher: Arc<MockFetcher>,
}

impl TestHarness {
    pub fn new(fetcher: MockFetcher) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.path().join("blessings.json")
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir.path().join("scrape_progress.json")
    }

    pub fn persistence(&self) -> SnapshotStore {
        SnapshotStore::new(self.snapshot_path(), self.progress_path())
    }

    pub fn collaborators(
        &self,
        primary: Arc<dyn SearchEngine>,
        secondary: Arc<dyn SearchEngine>,
    ) -> Collaborators {
        Collaborators {
            fetcher: self.fetcher.clone(),
            extractor: Arc::new(LineExtractor),
            primary_search: primary,
            secondary_search: secondary,
        }
    }
}

/// Orchestrator with deterministic queries and delays
pub fn test_orchestrator(
    config: &HarvestConfig,
    persistence: SnapshotStore,
    collaborators: Collaborators,
    seeds: SeedCatalog,
) -> AcquisitionOrchestrator {
    AcquisitionOrchestrator::new(config, persistence, collaborators)
        .with_seeds(seeds)
        .with_query_builder(QueryBuilder::with_seed(7))
        .with_throttle(Throttle::with_seed(config.throttle.clone(), 7))
}
