//! Services for blessing acquisition
//!
//! Leaf-first: text normalization, quality filtering, classification and
//! deduplication feed the bucket store; the orchestrator drives the store
//! from the source adapters and persists through the snapshot store.

pub mod acquisition_orchestrator;
pub mod bucket_store;
pub mod classifier;
pub mod coverage;
pub mod deduplicator;
pub mod dry_run;
pub mod html_extractor;
pub mod http_fetcher;
pub mod quality_filter;
pub mod query_builder;
pub mod search_engines;
pub mod seed_catalog;
pub mod snapshot_store;
pub mod text_normalizer;
pub mod throttle;

pub use acquisition_orchestrator::{
    AcquisitionOrchestrator, Collaborators, ComboOutcome, ComboState, HarvestReport,
    HarvestStatistics, ResumeSummary,
};
pub use bucket_store::{AddOutcome, BucketStore, RejectReason};
pub use classifier::Classifier;
pub use coverage::CoverageReport;
pub use deduplicator::Deduplicator;
pub use dry_run::DryRunPlan;
pub use html_extractor::HtmlExtractor;
pub use http_fetcher::HttpFetcher;
pub use quality_filter::{FilterVerdict, QualityFilter};
pub use query_builder::QueryBuilder;
pub use search_engines::{SogouWebSearch, WeixinSearch};
pub use seed_catalog::SeedCatalog;
pub use snapshot_store::SnapshotStore;
pub use throttle::{DelayRange, Throttle};
