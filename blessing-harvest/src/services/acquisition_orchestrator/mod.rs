//! Acquisition orchestrator
//!
//! Drives the bucket fill from external sources and persists resumable
//! state.
//!
//! # Phases
//! BULK → TARGETED
//!
//! - **BULK** (`phase_bulk`): every distinct seed URL is fetched once and its
//!   candidates are auto-classified into whatever buckets they fit.
//! - **TARGETED** (`phase_targeted`): each relationship × style combination
//!   still under quota is searched on the primary engine, then the secondary
//!   engine, then its relationship's seeds are replayed with forced labels.
//!   Progress and snapshot are persisted after every combination.
//!
//! # Resume
//! `resume_from_disk` restores persisted items (re-seeding the dedup index)
//! and per-combination progress. The bulk phase always runs again; targeted
//! combinations marked complete are skipped.
//!
//! # Cancellation
//! The token is checked between phases and at the top of each combination.
//! Long sleeps (politeness delays, backoff) also end early on cancellation.

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::models::{ComboProgress, Relationship, Style};
use crate::services::bucket_store::{AddOutcome, BucketStore, RestoreSummary};
use crate::services::coverage::CoverageReport;
use crate::services::dry_run::DryRunPlan;
use crate::services::query_builder::QueryBuilder;
use crate::services::seed_catalog::SeedCatalog;
use crate::services::snapshot_store::SnapshotStore;
use crate::services::throttle::Throttle;
use crate::types::{BlockSignal, ContentExtractor, PageFetcher, SearchEngine};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod phase_bulk;
mod phase_targeted;
pub mod statistics;

pub use statistics::{ComboOutcome, ComboState, HarvestReport, HarvestStatistics, RejectionCounts};

/// External capabilities the orchestrator drives
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub primary_search: Arc<dyn SearchEngine>,
    pub secondary_search: Arc<dyn SearchEngine>,
}

/// Result of a retried request
enum Attempt<T, E> {
    Done(T),
    /// Non-blocking failure, not retried
    Failed(E),
    /// Still blocked after the last attempt
    GaveUp,
    Cancelled,
}

/// What was reloaded by `resume_from_disk`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumeSummary {
    pub restored: RestoreSummary,
    pub completed_combos: usize,
}

pub struct AcquisitionOrchestrator {
    store: BucketStore,
    progress: ComboProgress,
    persistence: SnapshotStore,
    collaborators: Collaborators,
    queries: QueryBuilder,
    seeds: SeedCatalog,
    throttle: Throttle,
    statistics: HarvestStatistics,
}

impl AcquisitionOrchestrator {
    pub fn new(config: &HarvestConfig, persistence: SnapshotStore, collaborators: Collaborators) -> Self {
        Self {
            store: BucketStore::new(config),
            progress: ComboProgress::new(),
            persistence,
            collaborators,
            queries: QueryBuilder::from_entropy(),
            seeds: SeedCatalog::builtin(),
            throttle: Throttle::new(config.throttle.clone()),
            statistics: HarvestStatistics::default(),
        }
    }

    pub fn with_seeds(mut self, seeds: SeedCatalog) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_query_builder(mut self, queries: QueryBuilder) -> Self {
        self.queries = queries;
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    pub fn progress(&self) -> &ComboProgress {
        &self.progress
    }

    pub fn statistics(&self) -> &HarvestStatistics {
        &self.statistics
    }

    pub fn coverage(&self) -> CoverageReport {
        CoverageReport::from_grid(self.store.grid(), self.store.quota())
    }

    /// Reload the persisted snapshot and progress, if any
    pub fn resume_from_disk(&mut self) -> Result<ResumeSummary> {
        let mut summary = ResumeSummary::default();

        if let Some(snapshot) = self.persistence.load_snapshot()? {
            summary.restored = self.store.restore(snapshot.into_cells());
        }
        if let Some(progress) = self.persistence.load_progress()? {
            summary.completed_combos = progress.completed_count();
            self.progress = progress;
        }

        info!(
            restored = summary.restored.restored,
            skipped = summary.restored.skipped,
            completed_combos = summary.completed_combos,
            "Resumed from persisted state"
        );
        Ok(summary)
    }

    /// Seed URLs and queries a run would use, without fetching
    pub fn dry_run_plan(&mut self) -> DryRunPlan {
        DryRunPlan::build(&self.seeds, &mut self.queries, Some(&self.progress))
    }

    /// Run both phases
    ///
    /// Returns an error only when persistence fails; source failures are
    /// counted in the statistics.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<HarvestReport> {
        info!(
            quota = self.store.quota(),
            existing = self.store.total_count(),
            "Starting harvest"
        );

        if !cancel.is_cancelled() {
            self.phase_bulk(cancel).await;
            self.persistence.save_snapshot(self.store.grid())?;
            info!(
                total = self.store.total_count(),
                full_buckets = self.store.full_bucket_count(),
                "Bulk phase complete"
            );
        }

        let combos = self.phase_targeted(cancel).await?;
        self.persistence.save_snapshot(self.store.grid())?;

        let report = HarvestReport {
            statistics: self.statistics.clone(),
            combos,
            cancelled: cancel.is_cancelled(),
            total_count: self.store.total_count(),
            full_buckets: self.store.full_bucket_count(),
        };
        info!(
            total = report.total_count,
            full_buckets = report.full_buckets,
            cancelled = report.cancelled,
            "Harvest finished"
        );
        Ok(report)
    }

    /// Persist progress, then the snapshot
    ///
    /// A progress failure is logged and does not prevent the snapshot write;
    /// either failure is returned.
    fn persist(&self) -> Result<()> {
        let progress_result = self.persistence.save_progress(&self.progress);
        if let Err(e) = &progress_result {
            error!(error = %e, path = %self.persistence.progress_path().display(), "Failed to save progress");
        }

        self.persistence.save_snapshot(self.store.grid())?;
        progress_result?;
        Ok(())
    }

    fn record(&mut self, outcome: &AddOutcome) {
        self.statistics.record(outcome);
    }

    /// Fetch a document, backing off while blocked
    ///
    /// `None` means "no candidates from this source".
    async fn fetch_document(&mut self, url: &str, cancel: &CancellationToken) -> Option<String> {
        let fetcher = Arc::clone(&self.collaborators.fetcher);
        let (attempt, blocked) =
            with_backoff(&self.throttle, cancel, url, || fetcher.fetch(url)).await;
        self.statistics.blocked_responses += blocked;

        match attempt {
            Attempt::Done(document) => {
                self.statistics.pages_fetched += 1;
                Some(document)
            }
            Attempt::Failed(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                self.statistics.fetch_failures += 1;
                None
            }
            Attempt::GaveUp => {
                self.statistics.fetch_failures += 1;
                None
            }
            Attempt::Cancelled => None,
        }
    }

    /// Every result URL for `query` across the engine's pages
    async fn search(
        &mut self,
        engine: &Arc<dyn SearchEngine>,
        query: &str,
        cancel: &CancellationToken,
    ) -> Vec<String> {
        let mut urls = Vec::new();
        for page in 1..=engine.pages_per_query() {
            if cancel.is_cancelled() {
                break;
            }

            let what = format!("{} page {} of '{}'", engine.name(), page, query);
            let (attempt, blocked) =
                with_backoff(&self.throttle, cancel, &what, || engine.search_page(query, page)).await;
            self.statistics.blocked_responses += blocked;

            match attempt {
                Attempt::Done(links) => {
                    self.statistics.search_pages += 1;
                    urls.extend(links);
                }
                Attempt::Failed(e) => {
                    warn!(engine = engine.name(), query = %query, page, error = %e, "Search page failed");
                    self.statistics.search_failures += 1;
                }
                Attempt::GaveUp => self.statistics.search_failures += 1,
                Attempt::Cancelled => break,
            }

            let delay = self.throttle.search_delay();
            if !self.throttle.wait(delay, cancel).await {
                break;
            }
        }
        urls
    }

    /// Politeness pause after a page visit; `false` when cancelled
    async fn pause_after_fetch(&self, cancel: &CancellationToken) -> bool {
        let delay = self.throttle.fetch_delay();
        self.throttle.wait(delay, cancel).await
    }

    fn combo_done(&self, relationship: Relationship, style: Style) -> bool {
        self.store.is_combo_done(relationship, style)
    }
}

/// Run `request` until it succeeds, fails without a block signal, or stays
/// blocked for `max_retries` attempts
///
/// Returns the outcome and the number of blocked responses seen.
///
/// **Algorithm:**
/// 1. Wait for a permit from the per-minute ceiling, then send
/// 2. Blocked and attempts remain → sleep `uniform(backoff) * attempt`
/// 3. Blocked on the last attempt → give up
async fn with_backoff<T, E, F, Fut>(
    throttle: &Throttle,
    cancel: &CancellationToken,
    what: &str,
    mut request: F,
) -> (Attempt<T, E>, usize)
where
    E: BlockSignal + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let max_retries = throttle.config().max_retries.max(1);
    let mut blocked = 0;

    for attempt in 1..=max_retries {
        if cancel.is_cancelled() {
            return (Attempt::Cancelled, blocked);
        }
        throttle.acquire().await;

        match request().await {
            Ok(value) => return (Attempt::Done(value), blocked),
            Err(e) if e.is_blocked() => {
                blocked += 1;
                if attempt == max_retries {
                    warn!(request = %what, attempts = attempt, "Still blocked, giving up");
                    return (Attempt::GaveUp, blocked);
                }
                let delay = throttle.backoff_delay(attempt);
                warn!(
                    request = %what,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    "Blocked by anti-automation, backing off"
                );
                if !throttle.wait(delay, cancel).await {
                    return (Attempt::Cancelled, blocked);
                }
            }
            Err(e) => return (Attempt::Failed(e), blocked),
        }
    }

    (Attempt::GaveUp, blocked)
}
