//! Phase 1: BULK
//!
//! Seed pages mix audiences and tones, so every candidate is auto-classified.
//! Candidates with no detectable relationship are dropped here; the targeted
//! phase can still pick them up when a seed is replayed with forced labels.

use super::AcquisitionOrchestrator;
use tokio_util::sync::CancellationToken;
use tracing::info;

impl AcquisitionOrchestrator {
    /// Fetch every distinct seed URL once and auto-classify its candidates
    pub(super) async fn phase_bulk(&mut self, cancel: &CancellationToken) {
        let urls = self.seeds.bulk_urls();
        info!(urls = urls.len(), "Phase 1: BULK (seed sources, auto-classified)");

        for (i, url) in urls.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }

            let Some(document) = self.fetch_document(url, cancel).await else {
                continue;
            };

            let candidates = self.collaborators.extractor.extract(&document);
            let mut added = 0;
            for text in &candidates {
                let outcome = self.store.try_add_auto(text, url, None, None);
                self.record(&outcome);
                if outcome.is_admitted() {
                    added += 1;
                }
            }
            info!(
                seed = i + 1,
                of = urls.len(),
                url = %url,
                candidates = candidates.len(),
                added,
                "Seed processed"
            );

            if !self.pause_after_fetch(cancel).await {
                break;
            }
        }
    }
}
