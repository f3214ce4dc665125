//! Coverage report over the bucket grid
//!
//! Display: one row per relationship × style with the three length counts,
//! followed by totals and the list of cells still below quota.

use crate::models::{BucketGrid, Cell, LengthClass, Relationship, Style};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    counts: [[[usize; LengthClass::COUNT]; Style::COUNT]; Relationship::COUNT],
    quota: usize,
}

impl CoverageReport {
    pub fn from_grid(grid: &BucketGrid, quota: usize) -> Self {
        let mut counts = [[[0; LengthClass::COUNT]; Style::COUNT]; Relationship::COUNT];
        for (cell, items) in grid.iter() {
            counts[cell.relationship.index()][cell.style.index()][cell.length.index()] = items.len();
        }
        Self { counts, quota }
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.counts[cell.relationship.index()][cell.style.index()][cell.length.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().flatten().sum()
    }

    pub fn full_cells(&self) -> usize {
        Cell::all().filter(|cell| self.count(*cell) >= self.quota).count()
    }

    /// Share of cells at quota, in percent
    pub fn percent_full(&self) -> f64 {
        let cells = Relationship::COUNT * Style::COUNT * LengthClass::COUNT;
        100.0 * self.full_cells() as f64 / cells as f64
    }

    /// Cells below quota with their current counts, in declaration order
    pub fn gaps(&self) -> Vec<(Cell, usize)> {
        Cell::all()
            .map(|cell| (cell, self.count(cell)))
            .filter(|(_, count)| *count < self.quota)
            .collect()
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:<9} {:>6} {:>6} {:>6}", "relation", "style", "short", "medium", "long")?;
        for rel in Relationship::ALL {
            for style in Style::ALL {
                write!(f, "{:<10} {:<9}", rel.id(), style.id())?;
                for length in LengthClass::ALL {
                    let count = self.count(Cell::new(rel, style, length));
                    write!(f, " {:>6}", format!("{}/{}", count, self.quota))?;
                }
                writeln!(f)?;
            }
        }
        writeln!(
            f,
            "total {} items, {} of {} buckets full ({:.1}%)",
            self.total(),
            self.full_cells(),
            Relationship::COUNT * Style::COUNT * LengthClass::COUNT,
            self.percent_full()
        )?;

        let gaps = self.gaps();
        if !gaps.is_empty() {
            writeln!(f, "under quota:")?;
            for (cell, count) in gaps {
                writeln!(f, "  {} {}/{}", cell, count, self.quota)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlessingItem;

    #[test]
    fn test_counts_and_gaps() {
        let mut grid = BucketGrid::new();
        let full = Cell::new(Relationship::Elder, Style::Formal, LengthClass::Short);
        for i in 0..2 {
            grid.bucket_mut(full)
                .push(BlessingItem::new(format!("恭祝新春{}", i), 4, "u"));
        }

        let report = CoverageReport::from_grid(&grid, 2);
        assert_eq!(report.total(), 2);
        assert_eq!(report.full_cells(), 1);
        assert_eq!(report.gaps().len(), 89);
        assert!(report.gaps().iter().all(|(cell, _)| *cell != full));
        assert!((report.percent_full() - 100.0 / 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_lists_every_combo() {
        let report = CoverageReport::from_grid(&BucketGrid::new(), 10);
        let text = report.to_string();
        assert!(text.contains("customer   brief"));
        assert!(text.contains("total 0 items, 0 of 90 buckets full (0.0%)"));
        assert!(text.contains("elder:formal:short 0/10"));
    }
}
