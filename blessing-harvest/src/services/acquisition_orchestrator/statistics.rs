//! Harvest statistics and run report
//!
//! Display strings follow one shape per line so they can be logged as-is.

use crate::models::{Relationship, Style};
use crate::services::bucket_store::{AddOutcome, RejectReason};
use serde::Serialize;
use std::fmt;

/// **Rejections by reason**
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub empty: usize,
    pub quality: usize,
    pub unclassified: usize,
    pub length_gap: usize,
    pub bucket_full: usize,
    pub exact_duplicate: usize,
    pub near_duplicate: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        let slot = match reason {
            RejectReason::Empty => &mut self.empty,
            RejectReason::Quality(_) => &mut self.quality,
            RejectReason::Unclassified => &mut self.unclassified,
            RejectReason::LengthGap => &mut self.length_gap,
            RejectReason::BucketFull => &mut self.bucket_full,
            RejectReason::ExactDuplicate => &mut self.exact_duplicate,
            RejectReason::NearDuplicate => &mut self.near_duplicate,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.empty
            + self.quality
            + self.unclassified
            + self.length_gap
            + self.bucket_full
            + self.exact_duplicate
            + self.near_duplicate
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} rejected (quality {}, unclassified {}, length gap {}, bucket full {}, duplicate {}, near-duplicate {}, empty {})",
            self.total(),
            self.quality,
            self.unclassified,
            self.length_gap,
            self.bucket_full,
            self.exact_duplicate,
            self.near_duplicate,
            self.empty
        )
    }
}

/// **Counters across both phases**
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestStatistics {
    /// Documents fetched successfully
    pub pages_fetched: usize,
    /// Fetches that produced no document (transport error or retries exhausted)
    pub fetch_failures: usize,
    /// Result pages returned by search engines
    pub search_pages: usize,
    /// Result pages that failed
    pub search_failures: usize,
    /// Anti-automation responses, each followed by backoff or giving up
    pub blocked_responses: usize,
    /// Candidate strings fed to the store
    pub candidates_seen: usize,
    pub admitted: usize,
    pub rejected: RejectionCounts,
}

impl HarvestStatistics {
    pub fn record(&mut self, outcome: &AddOutcome) {
        self.candidates_seen += 1;
        match outcome {
            AddOutcome::Admitted(_) => self.admitted += 1,
            AddOutcome::Rejected(reason) => self.rejected.record(*reason),
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} pages fetched, {} fetch failures, {} search pages ({} failed), {} blocked; {} candidates, {} admitted, {}",
            self.pages_fetched,
            self.fetch_failures,
            self.search_pages,
            self.search_failures,
            self.blocked_responses,
            self.candidates_seen,
            self.admitted,
            self.rejected.display_string()
        )
    }
}

/// Combination lifecycle: `Pending → Querying → Satisfied | Exhausted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComboState {
    /// Not reached (run cancelled first)
    Pending,
    /// Interrupted by cancellation while acquiring
    Querying,
    /// All three length buckets at quota
    Satisfied,
    /// Every source tried, still under quota
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboOutcome {
    pub relationship: Relationship,
    pub style: Style,
    pub state: ComboState,
    /// Items admitted while processing this combination
    pub admitted: usize,
    /// Skipped because persisted progress marked it complete
    pub resumed: bool,
}

impl ComboOutcome {
    pub fn display_string(&self) -> String {
        let state = match self.state {
            ComboState::Pending => "pending",
            ComboState::Querying => "interrupted",
            ComboState::Satisfied if self.resumed => "complete (resumed)",
            ComboState::Satisfied => "satisfied",
            ComboState::Exhausted => "exhausted",
        };
        format!("{}:{} {} (+{})", self.relationship, self.style, state, self.admitted)
    }
}

/// Result of one `run`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub statistics: HarvestStatistics,
    pub combos: Vec<ComboOutcome>,
    pub cancelled: bool,
    pub total_count: usize,
    pub full_buckets: usize,
}

impl HarvestReport {
    pub fn combos_in(&self, state: ComboState) -> usize {
        self.combos.iter().filter(|c| c.state == state).count()
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} items, {}/90 buckets full{}",
            self.total_count,
            self.full_buckets,
            if self.cancelled { " (cancelled)" } else { "" }
        )?;
        writeln!(
            f,
            "combinations: {} satisfied, {} exhausted, {} interrupted, {} pending",
            self.combos_in(ComboState::Satisfied),
            self.combos_in(ComboState::Exhausted),
            self.combos_in(ComboState::Querying),
            self.combos_in(ComboState::Pending)
        )?;
        write!(f, "{}", self.statistics.display_string())
    }
}
