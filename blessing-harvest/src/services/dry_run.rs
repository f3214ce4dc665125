//! Dry-run planning: what a run would fetch and search, without network
//! access

use crate::models::{ComboProgress, Relationship, Style};
use crate::services::query_builder::QueryBuilder;
use crate::services::seed_catalog::SeedCatalog;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCombo {
    pub relationship: Relationship,
    pub style: Style,
    /// Already complete in persisted progress; would be skipped on resume
    pub complete: bool,
    pub queries: Vec<String>,
    pub seed_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunPlan {
    pub bulk_urls: Vec<String>,
    pub combos: Vec<PlannedCombo>,
}

impl DryRunPlan {
    pub fn build(
        seeds: &SeedCatalog,
        queries: &mut QueryBuilder,
        progress: Option<&ComboProgress>,
    ) -> Self {
        let mut combos = Vec::with_capacity(Relationship::COUNT * Style::COUNT);
        for relationship in Relationship::ALL {
            for style in Style::ALL {
                combos.push(PlannedCombo {
                    relationship,
                    style,
                    complete: progress.is_some_and(|p| p.is_complete(relationship, style)),
                    queries: queries.queries_for(relationship, style),
                    seed_urls: seeds.for_relationship(relationship).to_vec(),
                });
            }
        }

        Self {
            bulk_urls: seeds.bulk_urls(),
            combos,
        }
    }

    pub fn pending_combos(&self) -> usize {
        self.combos.iter().filter(|c| !c.complete).count()
    }
}

impl fmt::Display for DryRunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bulk phase: {} seed URLs", self.bulk_urls.len())?;
        for url in &self.bulk_urls {
            writeln!(f, "  {}", url)?;
        }
        writeln!(
            f,
            "Targeted phase: {} of {} combinations pending",
            self.pending_combos(),
            self.combos.len()
        )?;
        for combo in &self.combos {
            let marker = if combo.complete { " (complete)" } else { "" };
            writeln!(
                f,
                "  {}:{} [{} / {}]{}",
                combo.relationship,
                combo.style,
                combo.relationship.label(),
                combo.style.label(),
                marker
            )?;
            if combo.complete {
                continue;
            }
            for query in &combo.queries {
                writeln!(f, "    query: {}", query)?;
            }
            writeln!(f, "    seed fallback: {} URLs", combo.seed_urls.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_covers_all_combos() {
        let plan = DryRunPlan::build(&SeedCatalog::builtin(), &mut QueryBuilder::with_seed(1), None);
        assert_eq!(plan.combos.len(), 30);
        assert_eq!(plan.pending_combos(), 30);
        assert!(plan.combos.iter().all(|c| c.queries.len() == 5));
        assert_eq!(plan.combos[0].relationship, Relationship::Elder);
        assert_eq!(plan.combos[0].style, Style::Formal);
    }

    #[test]
    fn test_plan_marks_completed_combos() {
        let mut progress = ComboProgress::new();
        progress.mark_complete(Relationship::Friend, Style::Funny);

        let plan = DryRunPlan::build(
            &SeedCatalog::builtin(),
            &mut QueryBuilder::with_seed(1),
            Some(&progress),
        );
        assert_eq!(plan.pending_combos(), 29);
        assert!(plan.to_string().contains("friend:funny [朋友 / 搞笑] (complete)"));
    }
}
