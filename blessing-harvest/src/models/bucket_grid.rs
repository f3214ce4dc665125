//! Fixed relationship × style × length grid of buckets
//!
//! Indexed by enum ordinals, so every cell exists from construction and no
//! cell can be created by a mistyped label.

use super::blessing::BlessingItem;
use super::taxonomy::{Cell, LengthClass, Relationship, Style};

type Buckets = [[[Vec<BlessingItem>; LengthClass::COUNT]; Style::COUNT]; Relationship::COUNT];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketGrid {
    cells: Buckets,
}

impl BucketGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, cell: Cell) -> &[BlessingItem] {
        &self.cells[cell.relationship.index()][cell.style.index()][cell.length.index()]
    }

    pub(crate) fn bucket_mut(&mut self, cell: Cell) -> &mut Vec<BlessingItem> {
        &mut self.cells[cell.relationship.index()][cell.style.index()][cell.length.index()]
    }

    /// All buckets in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &[BlessingItem])> + '_ {
        Cell::all().map(move |cell| (cell, self.bucket(cell)))
    }

    pub fn total_count(&self) -> usize {
        self.iter().map(|(_, items)| items.len()).sum()
    }
}
