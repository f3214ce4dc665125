//! Persisted snapshot document
//!
//! Layout consumed by the downstream application:
//!
//! ```json
//! {
//!   "metadata": { "generated_at": "...", "total_count": 42 },
//!   "blessings": { "elder": { "formal": { "short": [ {"text", "char_count", "source_url"} ] } } },
//!   "stats": { "elder": { "formal": { "short": 3 } } }
//! }
//! ```
//!
//! Keys are written in declaration order.

use super::blessing::BlessingItem;
use super::bucket_grid::BucketGrid;
use super::taxonomy::{Cell, LengthClass, Relationship, Style};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub generated_at: String,
    pub total_count: usize,
}

/// Borrowing view of the grid written to disk
#[derive(Serialize)]
pub struct SnapshotDocument<'a> {
    pub metadata: SnapshotMetadata,
    pub blessings: GridItems<'a>,
    pub stats: GridCounts<'a>,
}

impl<'a> SnapshotDocument<'a> {
    pub fn new(grid: &'a BucketGrid, generated_at: String) -> Self {
        Self {
            metadata: SnapshotMetadata {
                generated_at,
                total_count: grid.total_count(),
            },
            blessings: GridItems(grid),
            stats: GridCounts(grid),
        }
    }
}

/// Serializes as `relationship → style → length → [items]`
pub struct GridItems<'a>(&'a BucketGrid);

/// Serializes as `relationship → style → length → count`
pub struct GridCounts<'a>(&'a BucketGrid);

fn serialize_nested<S, V, F>(serializer: S, leaf: F) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
    F: Fn(Cell) -> V + Copy,
{
    struct Styles<F>(Relationship, F);
    struct Lengths<F>(Relationship, Style, F);

    impl<V: Serialize, F: Fn(Cell) -> V + Copy> Serialize for Lengths<F> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(LengthClass::COUNT))?;
            for length in LengthClass::ALL {
                map.serialize_entry(length.id(), &(self.2)(Cell::new(self.0, self.1, length)))?;
            }
            map.end()
        }
    }

    impl<V: Serialize, F: Fn(Cell) -> V + Copy> Serialize for Styles<F> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(Style::COUNT))?;
            for style in Style::ALL {
                map.serialize_entry(style.id(), &Lengths(self.0, style, self.1))?;
            }
            map.end()
        }
    }

    let mut map = serializer.serialize_map(Some(Relationship::COUNT))?;
    for rel in Relationship::ALL {
        map.serialize_entry(rel.id(), &Styles(rel, leaf))?;
    }
    map.end()
}

impl Serialize for GridItems<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let grid = self.0;
        serialize_nested(serializer, move |cell| grid.bucket(cell))
    }
}

impl Serialize for GridCounts<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let grid = self.0;
        serialize_nested(serializer, move |cell| grid.bucket(cell).len())
    }
}

type RawBlessings = HashMap<String, HashMap<String, HashMap<String, Vec<BlessingItem>>>>;

/// Snapshot as read back from disk
///
/// Only `blessings` matters for restoring state; `stats` is derived and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct LoadedSnapshot {
    #[serde(default)]
    pub metadata: Option<SnapshotMetadata>,
    #[serde(default)]
    pub blessings: RawBlessings,
}

impl LoadedSnapshot {
    /// Convert to typed cells in declaration order, dropping unknown labels
    pub fn into_cells(mut self) -> Vec<(Cell, Vec<BlessingItem>)> {
        for key in self.blessings.keys() {
            if key.parse::<Relationship>().is_err() {
                warn!(relationship = %key, "Ignoring unknown relationship in snapshot");
            }
        }

        let mut cells = Vec::new();
        for rel in Relationship::ALL {
            let Some(mut styles) = self.blessings.remove(rel.id()) else {
                continue;
            };
            for style in Style::ALL {
                let Some(mut lengths) = styles.remove(style.id()) else {
                    continue;
                };
                for length in LengthClass::ALL {
                    if let Some(items) = lengths.remove(length.id()) {
                        cells.push((Cell::new(rel, style, length), items));
                    }
                }
                for unknown in lengths.keys() {
                    warn!(relationship = %rel, style = %style, length = %unknown, "Ignoring unknown length in snapshot");
                }
            }
            for unknown in styles.keys() {
                warn!(relationship = %rel, style = %unknown, "Ignoring unknown style in snapshot");
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(rel: Relationship, style: Style, length: LengthClass) -> Cell {
        Cell::new(rel, style, length)
    }

    #[test]
    fn test_document_layout() {
        let mut grid = BucketGrid::new();
        grid.bucket_mut(cell(Relationship::Friend, Style::Casual, LengthClass::Short))
            .push(BlessingItem::new("新年快乐呀", 5, "https://a.example"));

        let doc = SnapshotDocument::new(&grid, "2026-01-01T00:00:00+08:00".to_string());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["metadata"]["total_count"], 1);
        assert_eq!(
            value["blessings"]["friend"]["casual"]["short"][0]["text"],
            "新年快乐呀"
        );
        assert_eq!(value["stats"]["friend"]["casual"]["short"], 1);
        assert_eq!(value["stats"]["elder"]["brief"]["long"], 0);
    }

    #[test]
    fn test_keys_written_in_declaration_order() {
        let grid = BucketGrid::new();
        let doc = SnapshotDocument::new(&grid, String::new());
        let json = serde_json::to_string(&doc).unwrap();

        let elder = json.find("\"elder\"").unwrap();
        let customer = json.find("\"customer\"").unwrap();
        let formal = json.find("\"formal\"").unwrap();
        let brief = json.find("\"brief\"").unwrap();
        assert!(elder < customer);
        assert!(formal < brief);
    }

    #[test]
    fn test_loaded_snapshot_drops_unknown_labels() {
        let json = r#"{
            "blessings": {
                "elder": { "formal": { "short": [ {"text": "恭祝新春", "char_count": 4, "source_url": "u"} ],
                                        "huge": [] } },
                "stranger": { "formal": { "short": [] } }
            }
        }"#;
        let loaded: LoadedSnapshot = serde_json::from_str(json).unwrap();
        let cells = loaded.into_cells();

        assert_eq!(cells.len(), 1);
        assert_eq!(
            cells[0].0,
            cell(Relationship::Elder, Style::Formal, LengthClass::Short)
        );
        assert_eq!(cells[0].1.len(), 1);
    }
}
