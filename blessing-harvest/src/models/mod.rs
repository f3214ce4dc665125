//! Data models for the blessing corpus

pub mod blessing;
pub mod bucket_grid;
pub mod progress;
pub mod snapshot;
pub mod taxonomy;

pub use blessing::BlessingItem;
pub use bucket_grid::BucketGrid;
pub use progress::ComboProgress;
pub use snapshot::{LoadedSnapshot, SnapshotDocument, SnapshotMetadata};
pub use taxonomy::{Cell, CountRange, LengthClass, LengthRanges, Relationship, Style};
