//! Phase 2: TARGETED
//!
//! One pass over the 30 relationship × style combinations in declaration
//! order. Each combination escalates through its sources and stops as soon
//! as all three of its length buckets are at quota:
//!
//! 1. Primary engine, all five queries
//! 2. Secondary engine, first query only
//! 3. The relationship's seed pages with forced labels

use super::statistics::{ComboOutcome, ComboState};
use super::AcquisitionOrchestrator;
use crate::error::Result;
use crate::models::{Relationship, Style};
use crate::types::SearchEngine;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Merge URL lists, dropping exact repeats and keeping first-seen order
pub(crate) fn merge_urls<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for url in lists.into_iter().flatten() {
        if seen.insert(url.clone()) {
            merged.push(url);
        }
    }
    merged
}

impl AcquisitionOrchestrator {
    /// Process every combination, persisting after each one
    pub(super) async fn phase_targeted(&mut self, cancel: &CancellationToken) -> Result<Vec<ComboOutcome>> {
        info!("Phase 2: TARGETED (per-combination search)");

        let mut outcomes = Vec::with_capacity(Relationship::COUNT * Style::COUNT);
        for relationship in Relationship::ALL {
            for style in Style::ALL {
                if cancel.is_cancelled() {
                    outcomes.push(ComboOutcome {
                        relationship,
                        style,
                        state: ComboState::Pending,
                        admitted: 0,
                        resumed: false,
                    });
                    continue;
                }

                if self.progress.is_complete(relationship, style) {
                    debug!(combo = %format!("{}:{}", relationship, style), "Already complete, skipping");
                    outcomes.push(ComboOutcome {
                        relationship,
                        style,
                        state: ComboState::Satisfied,
                        admitted: 0,
                        resumed: true,
                    });
                    continue;
                }

                let outcome = self.process_combo(relationship, style, cancel).await;
                info!(
                    combo = %outcome.display_string(),
                    done = outcomes.len() + 1,
                    of = Relationship::COUNT * Style::COUNT,
                    "Combination processed"
                );
                outcomes.push(outcome);
                self.persist()?;
            }
        }
        Ok(outcomes)
    }

    /// Escalate through the combination's sources until it is satisfied
    async fn process_combo(
        &mut self,
        relationship: Relationship,
        style: Style,
        cancel: &CancellationToken,
    ) -> ComboOutcome {
        let before = self.store.total_count();

        if !self.combo_done(relationship, style) {
            info!(
                relationship = %relationship,
                style = %style,
                labels = %format!("{}×{}", relationship.label(), style.label()),
                "Searching"
            );
            let queries = self.queries.queries_for(relationship, style);

            let primary = Arc::clone(&self.collaborators.primary_search);
            self.search_and_scrape(&primary, &queries, relationship, style, cancel)
                .await;

            if !self.combo_done(relationship, style) {
                let secondary = Arc::clone(&self.collaborators.secondary_search);
                self.search_and_scrape(&secondary, &queries[..1], relationship, style, cancel)
                    .await;
            }

            if !self.combo_done(relationship, style) {
                self.replay_seeds(relationship, style, cancel).await;
            }
        }

        let state = if self.combo_done(relationship, style) {
            self.progress.mark_complete(relationship, style);
            ComboState::Satisfied
        } else if cancel.is_cancelled() {
            ComboState::Querying
        } else {
            ComboState::Exhausted
        };

        ComboOutcome {
            relationship,
            style,
            state,
            admitted: self.store.total_count() - before,
            resumed: false,
        }
    }

    /// Search every query, then visit the merged result URLs
    ///
    /// Returns the number of admitted items.
    async fn search_and_scrape(
        &mut self,
        engine: &Arc<dyn SearchEngine>,
        queries: &[String],
        relationship: Relationship,
        style: Style,
        cancel: &CancellationToken,
    ) -> usize {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            if cancel.is_cancelled() {
                break;
            }
            let urls = self.search(engine, query, cancel).await;
            info!(engine = engine.name(), query = %query, found = urls.len(), "Search complete");
            results.push(urls);
        }

        let urls = merge_urls(results);
        debug!(engine = engine.name(), unique = urls.len(), "Unique URLs to visit");

        let mut added = 0;
        for url in &urls {
            if self.combo_done(relationship, style) {
                info!(relationship = %relationship, style = %style, "All buckets full, stopping early");
                break;
            }
            if cancel.is_cancelled() {
                break;
            }
            added += self.scrape_for_combo(url, relationship, style, cancel).await;
            if !self.pause_after_fetch(cancel).await {
                break;
            }
        }
        added
    }

    /// Replay the relationship's seed pages with forced labels
    async fn replay_seeds(&mut self, relationship: Relationship, style: Style, cancel: &CancellationToken) {
        let seeds = self.seeds.for_relationship(relationship).to_vec();
        for url in &seeds {
            if self.combo_done(relationship, style) || cancel.is_cancelled() {
                break;
            }
            let added = self.scrape_for_combo(url, relationship, style, cancel).await;
            if added > 0 {
                info!(url = %url, added, "Seed replay admitted items");
            }
            if !self.pause_after_fetch(cancel).await {
                break;
            }
        }
    }

    /// Fetch one page and admit its candidates under the given labels
    async fn scrape_for_combo(
        &mut self,
        url: &str,
        relationship: Relationship,
        style: Style,
        cancel: &CancellationToken,
    ) -> usize {
        let Some(document) = self.fetch_document(url, cancel).await else {
            return 0;
        };

        let candidates = self.collaborators.extractor.extract(&document);
        let mut added = 0;
        for text in &candidates {
            let outcome = self.store.try_add(text, relationship, style, url);
            self.record(&outcome);
            if outcome.is_admitted() {
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let merged = merge_urls(vec![
            vec!["b".to_string(), "a".to_string()],
            vec!["c".to_string(), "b".to_string(), "a".to_string()],
            vec!["d".to_string()],
        ]);
        assert_eq!(merged, vec!["b", "a", "c", "d"]);
    }
}
