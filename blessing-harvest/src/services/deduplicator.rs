//! Deduplication for admitted blessings
//!
//! Two layers:
//! 1. **Exact**: the normalized text must not already exist anywhere in the
//!    store (global set, O(1) lookup).
//! 2. **Near**: the LCS ratio between the normalized candidate and every item
//!    already in the destination bucket must not exceed the threshold.
//!
//! Near-duplicate checking is scoped to the destination bucket. The same
//! sentiment phrased for a different audience, style or length is a distinct
//! entry; near-identical phrasing within one cell is not.

use crate::models::BlessingItem;
use crate::services::text_normalizer::normalize;
use std::collections::HashSet;

/// Default similarity above which two texts in one bucket are duplicates
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Similarity ratio `2 * LCS(a, b) / (|a| + |b|)` over chars, in `[0, 1]`
///
/// Two empty strings are identical (ratio 1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // Rolling single-row LCS table over the shorter string
    let (outer, inner) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
    let mut row = vec![0usize; inner.len() + 1];
    for oc in outer.iter() {
        let mut diagonal = 0;
        for (j, ic) in inner.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if oc == ic {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    let lcs = row[inner.len()];

    2.0 * lcs as f64 / total as f64
}

/// Why a candidate was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupVerdict {
    Unique,
    ExactDuplicate,
    NearDuplicate,
}

/// Owns the global normalized-text index
#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: f64,
    index: HashSet<String>,
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            index: HashSet::new(),
        }
    }

    /// Number of normalized texts in the global index
    pub fn indexed_count(&self) -> usize {
        self.index.len()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains(&normalize(text))
    }

    fn check_normalized(&self, normalized: &str, bucket: &[BlessingItem]) -> DedupVerdict {
        if self.index.contains(normalized) {
            return DedupVerdict::ExactDuplicate;
        }

        let near = bucket
            .iter()
            .any(|existing| similarity_ratio(normalized, &normalize(&existing.text)) > self.threshold);
        if near {
            DedupVerdict::NearDuplicate
        } else {
            DedupVerdict::Unique
        }
    }

    /// Admit `item` into `bucket` when unique
    ///
    /// On `Unique` the normalized text is indexed and the item appended; any
    /// other verdict leaves both untouched.
    pub fn admit(&mut self, item: BlessingItem, bucket: &mut Vec<BlessingItem>) -> DedupVerdict {
        let normalized = normalize(&item.text);
        let verdict = self.check_normalized(&normalized, bucket);
        if verdict == DedupVerdict::Unique {
            self.index.insert(normalized);
            bucket.push(item);
        }
        verdict
    }

    /// Index and append without the near-duplicate check
    ///
    /// Used when reloading persisted buckets, whose items were already
    /// checked when first admitted.
    pub fn index_unchecked(&mut self, item: BlessingItem, bucket: &mut Vec<BlessingItem>) {
        self.index.insert(normalize(&item.text));
        bucket.push(item);
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> BlessingItem {
        BlessingItem::new(text, crate::services::text_normalizer::count_cjk(text), "test://")
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("新年快乐", "新年快乐"), 1.0);
        assert_eq!(similarity_ratio("新年", ""), 0.0);
        assert_eq!(similarity_ratio("春节", "快乐"), 0.0);
    }

    #[test]
    fn test_ratio_counts_subsequence() {
        // LCS("abcd", "acbd") = 3 -> 6 / 8
        assert!((similarity_ratio("abcd", "acbd") - 0.75).abs() < 1e-9);
        // Symmetric
        assert_eq!(
            similarity_ratio("祝您新年快乐", "祝你新春快乐"),
            similarity_ratio("祝你新春快乐", "祝您新年快乐")
        );
    }

    #[test]
    fn test_exact_duplicate_rejected_globally() {
        let mut dedup = Deduplicator::default();
        let mut bucket_a = Vec::new();
        let mut bucket_b = Vec::new();

        assert_eq!(dedup.admit(item("祝您新春快乐万事如意"), &mut bucket_a), DedupVerdict::Unique);
        // Different bucket, same normalized text
        assert_eq!(
            dedup.admit(item("祝您新春快乐 万事如意！"), &mut bucket_b),
            DedupVerdict::ExactDuplicate
        );
        assert!(bucket_b.is_empty());
        assert_eq!(dedup.indexed_count(), 1);
    }

    #[test]
    fn test_near_duplicate_rejected_within_bucket_only() {
        let mut dedup = Deduplicator::default();
        let mut bucket = Vec::new();
        let mut other_bucket = Vec::new();

        let original = "祝您新春快乐，身体健康，万事如意，阖家幸福";
        let particle = "祝您新春快乐，身体健康啊，万事如意，阖家幸福";

        assert_eq!(dedup.admit(item(original), &mut bucket), DedupVerdict::Unique);
        assert_eq!(dedup.admit(item(particle), &mut bucket), DedupVerdict::NearDuplicate);
        assert_eq!(bucket.len(), 1);

        // The same near-duplicate is fine in another bucket
        assert_eq!(dedup.admit(item(particle), &mut other_bucket), DedupVerdict::Unique);
    }
}
