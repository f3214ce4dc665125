//! Quota-bounded bucket store
//!
//! Owns the relationship × style × length grid and the global dedup index.
//! Every admission goes through one pipeline:
//!
//! **Algorithm:**
//! 1. `clean_candidate` the raw text (empty after cleaning → `Empty`)
//! 2. Quality filter (`Quality(verdict)`)
//! 3. Length-classify the CJK count (gap zone → `LengthGap`)
//! 4. Quota check on the destination bucket (`BucketFull`)
//! 5. Exact then near-duplicate check (`ExactDuplicate` / `NearDuplicate`)
//! 6. Append
//!
//! A rejected attempt leaves the store untouched.

use crate::config::HarvestConfig;
use crate::models::{BlessingItem, BucketGrid, Cell, LengthClass, LengthRanges, Relationship, Style};
use crate::services::classifier::Classifier;
use crate::services::deduplicator::{DedupVerdict, Deduplicator};
use crate::services::quality_filter::{FilterVerdict, QualityFilter};
use crate::services::text_normalizer::{clean_candidate, count_cjk};
use serde::Serialize;
use tracing::{debug, warn};

/// Style assigned by auto-classification when none is detected and no hint
/// is given
pub const DEFAULT_STYLE: Style = Style::Formal;

/// Why a candidate was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    Empty,
    Quality(FilterVerdict),
    Unclassified,
    LengthGap,
    BucketFull,
    ExactDuplicate,
    NearDuplicate,
}

/// Result of one admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Admitted(Cell),
    Rejected(RejectReason),
}

impl AddOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AddOutcome::Admitted(_))
    }
}

/// Counts from restoring a persisted grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    pub skipped: usize,
}

pub struct BucketStore {
    grid: BucketGrid,
    dedup: Deduplicator,
    filter: QualityFilter,
    classifier: Classifier,
    length_ranges: LengthRanges,
    quota: usize,
}

impl BucketStore {
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            grid: BucketGrid::new(),
            dedup: Deduplicator::new(config.similarity_threshold),
            filter: QualityFilter::new(&config.quality),
            classifier: Classifier::new(config.brief_max_cjk),
            length_ranges: config.length_ranges,
            quota: config.quota_per_bucket,
        }
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn grid(&self) -> &BucketGrid {
        &self.grid
    }

    pub fn bucket(&self, cell: Cell) -> &[BlessingItem] {
        self.grid.bucket(cell)
    }

    pub fn is_full(&self, cell: Cell) -> bool {
        self.grid.bucket(cell).len() >= self.quota
    }

    /// All three length buckets of the combination are at quota
    pub fn is_combo_done(&self, relationship: Relationship, style: Style) -> bool {
        LengthClass::ALL
            .into_iter()
            .all(|length| self.is_full(Cell::new(relationship, style, length)))
    }

    pub fn total_count(&self) -> usize {
        self.grid.total_count()
    }

    pub fn full_bucket_count(&self) -> usize {
        Cell::all().filter(|cell| self.is_full(*cell)).count()
    }

    /// Admit `text` into the bucket for the given labels
    pub fn try_add(
        &mut self,
        text: &str,
        relationship: Relationship,
        style: Style,
        source_url: &str,
    ) -> AddOutcome {
        let cleaned = match self.screen(text) {
            Ok(cleaned) => cleaned,
            Err(reason) => return AddOutcome::Rejected(reason),
        };
        self.place(cleaned, relationship, style, source_url)
    }

    /// Classify `text` and admit it
    ///
    /// An undetected relationship falls back to `fallback_relationship`, or
    /// rejects as `Unclassified` without one. An undetected style falls back
    /// to `fallback_style`, then to [`DEFAULT_STYLE`].
    pub fn try_add_auto(
        &mut self,
        text: &str,
        source_url: &str,
        fallback_relationship: Option<Relationship>,
        fallback_style: Option<Style>,
    ) -> AddOutcome {
        let cleaned = match self.screen(text) {
            Ok(cleaned) => cleaned,
            Err(reason) => return AddOutcome::Rejected(reason),
        };

        let detected = self.classifier.classify(&cleaned);
        let Some(relationship) = detected.relationship.or(fallback_relationship) else {
            return AddOutcome::Rejected(RejectReason::Unclassified);
        };
        let style = detected.style.or(fallback_style).unwrap_or(DEFAULT_STYLE);

        self.place(cleaned, relationship, style, source_url)
    }

    /// Clean and quality-check
    fn screen(&self, text: &str) -> Result<String, RejectReason> {
        let cleaned = clean_candidate(text);
        if cleaned.is_empty() {
            return Err(RejectReason::Empty);
        }
        match self.filter.evaluate(&cleaned) {
            FilterVerdict::Accepted => Ok(cleaned),
            verdict => Err(RejectReason::Quality(verdict)),
        }
    }

    fn place(
        &mut self,
        cleaned: String,
        relationship: Relationship,
        style: Style,
        source_url: &str,
    ) -> AddOutcome {
        let char_count = count_cjk(&cleaned);
        let Some(length) = self.length_ranges.classify(char_count) else {
            return AddOutcome::Rejected(RejectReason::LengthGap);
        };

        let cell = Cell::new(relationship, style, length);
        if self.is_full(cell) {
            return AddOutcome::Rejected(RejectReason::BucketFull);
        }

        let item = BlessingItem::new(cleaned, char_count, source_url);
        match self.dedup.admit(item, self.grid.bucket_mut(cell)) {
            DedupVerdict::Unique => {
                debug!(cell = %cell, char_count, "Admitted blessing");
                AddOutcome::Admitted(cell)
            }
            DedupVerdict::ExactDuplicate => AddOutcome::Rejected(RejectReason::ExactDuplicate),
            DedupVerdict::NearDuplicate => AddOutcome::Rejected(RejectReason::NearDuplicate),
        }
    }

    /// Reload persisted items, re-seeding the dedup index
    ///
    /// Items are taken as persisted (no re-filtering). Items past quota or
    /// duplicating an already restored text are skipped.
    pub fn restore(&mut self, cells: Vec<(Cell, Vec<BlessingItem>)>) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        for (cell, items) in cells {
            for item in items {
                if self.is_full(cell) {
                    warn!(cell = %cell, quota = self.quota, "Skipping persisted item beyond quota");
                    summary.skipped += 1;
                    continue;
                }
                if self.dedup.contains(&item.text) {
                    warn!(cell = %cell, "Skipping persisted duplicate item");
                    summary.skipped += 1;
                    continue;
                }
                self.dedup.index_unchecked(item, self.grid.bucket_mut(cell));
                summary.restored += 1;
            }
        }
        debug!(indexed = self.dedup.indexed_count(), "Dedup index re-seeded");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_quota(quota: usize) -> BucketStore {
        let config = HarvestConfig {
            quota_per_bucket: quota,
            ..HarvestConfig::default()
        };
        BucketStore::new(&config)
    }

    #[test]
    fn test_try_add_admits_into_length_bucket() {
        let mut store = store_with_quota(10);
        let outcome = store.try_add("1、祝您新春快乐，万事如意", Relationship::Friend, Style::Casual, "u");

        let cell = Cell::new(Relationship::Friend, Style::Casual, LengthClass::Short);
        assert_eq!(outcome, AddOutcome::Admitted(cell));
        // List prefix stripped before storage
        assert_eq!(store.bucket(cell)[0].text, "祝您新春快乐，万事如意");
        assert_eq!(store.bucket(cell)[0].char_count, 10);
    }

    #[test]
    fn test_empty_after_cleaning() {
        let mut store = store_with_quota(10);
        assert_eq!(
            store.try_add("  —— ", Relationship::Elder, Style::Formal, "u"),
            AddOutcome::Rejected(RejectReason::Empty)
        );
    }

    #[test]
    fn test_gap_zone_is_dropped() {
        let mut store = store_with_quota(10);
        let text = format!("祝福新年{}", "好".repeat(646));
        assert_eq!(count_cjk(&text), 650);
        assert_eq!(
            store.try_add(&text, Relationship::Elder, Style::Formal, "u"),
            AddOutcome::Rejected(RejectReason::LengthGap)
        );
        assert_eq!(store.total_count(), 0);
    }

    #[test]
    fn test_full_bucket_rejects() {
        let mut store = store_with_quota(1);
        assert!(store
            .try_add("祝您新春快乐万事如意", Relationship::Leader, Style::Brief, "u")
            .is_admitted());
        assert_eq!(
            store.try_add("恭贺新禧阖家幸福安康", Relationship::Leader, Style::Brief, "u"),
            AddOutcome::Rejected(RejectReason::BucketFull)
        );
    }

    #[test]
    fn test_auto_without_relationship_is_unclassified() {
        let mut store = store_with_quota(10);
        assert_eq!(
            store.try_add_auto("祝您新春快乐万事如意", "u", None, None),
            AddOutcome::Rejected(RejectReason::Unclassified)
        );
        assert_eq!(store.total_count(), 0);
    }

    #[test]
    fn test_auto_uses_fallbacks_and_default_style() {
        let mut store = store_with_quota(10);
        // No relationship indicator, brief by length
        let outcome = store.try_add_auto("祝您新春快乐万事如意", "u", Some(Relationship::Customer), None);
        assert_eq!(
            outcome,
            AddOutcome::Admitted(Cell::new(Relationship::Customer, Style::Brief, LengthClass::Short))
        );

        // Long enough to skip the brief shortcut, no style indicator
        let text = format!("祝父母新春快乐万事如意{}", "的".repeat(40));
        let outcome = store.try_add_auto(&text, "u", None, None);
        assert_eq!(
            outcome,
            AddOutcome::Admitted(Cell::new(Relationship::Elder, DEFAULT_STYLE, LengthClass::Medium))
        );
    }

    #[test]
    fn test_combo_done_needs_all_lengths() {
        let mut store = store_with_quota(1);
        let rel = Relationship::Friend;
        let style = Style::Formal;
        store.try_add("祝您新春快乐万事如意", rel, style, "u");
        assert!(!store.is_combo_done(rel, style));

        store.try_add(&format!("祝您新春快乐{}", "好".repeat(60)), rel, style, "u");
        store.try_add(&format!("恭贺新禧万事如意{}", "好".repeat(300)), rel, style, "u");
        assert!(store.is_combo_done(rel, style));
        assert_eq!(store.full_bucket_count(), 3);
    }

    #[test]
    fn test_restore_skips_over_quota_and_duplicates() {
        let mut store = store_with_quota(2);
        let cell = Cell::new(Relationship::Elder, Style::Brief, LengthClass::Short);
        let items = vec![
            BlessingItem::new("祝爸妈新年快乐", 7, "a"),
            BlessingItem::new("祝爸妈新年快乐！", 7, "b"),
            BlessingItem::new("祝爷爷奶奶福寿安康", 9, "c"),
            BlessingItem::new("祝外公外婆健康长寿", 9, "d"),
        ];

        let summary = store.restore(vec![(cell, items)]);
        assert_eq!(summary, RestoreSummary { restored: 2, skipped: 2 });
        assert_eq!(store.bucket(cell).len(), 2);

        // Restored texts are indexed
        assert_eq!(
            store.try_add("祝爸妈新年快乐", Relationship::Friend, Style::Brief, "u"),
            AddOutcome::Rejected(RejectReason::ExactDuplicate)
        );
    }
}
