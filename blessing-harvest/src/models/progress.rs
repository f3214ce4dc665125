//! Per-combination completion flags
//!
//! Persisted as a flat JSON object keyed `"relationship:style"`. The flags only
//! gate resumed runs; they are derived from bucket fill state.

use super::taxonomy::{Relationship, Style};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboProgress {
    done: [[bool; Style::COUNT]; Relationship::COUNT],
}

impl ComboProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress key for a combination
    pub fn key(relationship: Relationship, style: Style) -> String {
        format!("{}:{}", relationship.id(), style.id())
    }

    /// Parse a `"relationship:style"` key
    pub fn parse_key(key: &str) -> Option<(Relationship, Style)> {
        let (rel, style) = key.split_once(':')?;
        Some((rel.parse().ok()?, style.parse().ok()?))
    }

    pub fn is_complete(&self, relationship: Relationship, style: Style) -> bool {
        self.done[relationship.index()][style.index()]
    }

    pub fn mark_complete(&mut self, relationship: Relationship, style: Style) {
        self.done[relationship.index()][style.index()] = true;
    }

    pub fn completed_count(&self) -> usize {
        self.done.iter().flatten().filter(|d| **d).count()
    }
}

impl Serialize for ComboProgress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Relationship::COUNT * Style::COUNT))?;
        for rel in Relationship::ALL {
            for style in Style::ALL {
                map.serialize_entry(&Self::key(rel, style), &self.is_complete(rel, style))?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ComboProgress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProgressVisitor;

        impl<'de> Visitor<'de> for ProgressVisitor {
            type Value = ComboProgress;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of \"relationship:style\" keys to booleans")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut progress = ComboProgress::new();
                while let Some((key, done)) = access.next_entry::<String, bool>()? {
                    match ComboProgress::parse_key(&key) {
                        Some((rel, style)) if done => progress.mark_complete(rel, style),
                        Some(_) => {}
                        None => tracing::warn!(key = %key, "Ignoring unknown progress key"),
                    }
                }
                Ok(progress)
            }
        }

        deserializer.deserialize_map(ProgressVisitor)
    }
}
