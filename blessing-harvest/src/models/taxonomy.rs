//! Classification axes: relationship, style, length
//!
//! All three are closed enums. `ALL` slices list the variants in declaration
//! order, which is also the tie-break order for keyword scoring and the key
//! order of persisted documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target audience of a blessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Elder,
    Colleague,
    Leader,
    Friend,
    Partner,
    Customer,
}

impl Relationship {
    pub const COUNT: usize = 6;

    pub const ALL: [Relationship; Self::COUNT] = [
        Relationship::Elder,
        Relationship::Colleague,
        Relationship::Leader,
        Relationship::Friend,
        Relationship::Partner,
        Relationship::Customer,
    ];

    /// Position in `ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire id used in persisted documents
    pub fn id(self) -> &'static str {
        match self {
            Relationship::Elder => "elder",
            Relationship::Colleague => "colleague",
            Relationship::Leader => "leader",
            Relationship::Friend => "friend",
            Relationship::Partner => "partner",
            Relationship::Customer => "customer",
        }
    }

    /// Chinese display label (matches the consumer application)
    pub fn label(self) -> &'static str {
        match self {
            Relationship::Elder => "长辈",
            Relationship::Colleague => "同事",
            Relationship::Leader => "领导",
            Relationship::Friend => "朋友",
            Relationship::Partner => "恋人",
            Relationship::Customer => "客户",
        }
    }
}

/// Tone of a blessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Formal,
    Casual,
    Funny,
    Literary,
    Brief,
}

impl Style {
    pub const COUNT: usize = 5;

    pub const ALL: [Style; Self::COUNT] = [
        Style::Formal,
        Style::Casual,
        Style::Funny,
        Style::Literary,
        Style::Brief,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            Style::Formal => "formal",
            Style::Casual => "casual",
            Style::Funny => "funny",
            Style::Literary => "literary",
            Style::Brief => "brief",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Style::Formal => "正式",
            Style::Casual => "轻松",
            Style::Funny => "搞笑",
            Style::Literary => "文艺",
            Style::Brief => "简短",
        }
    }
}

/// Length bucket derived from a CJK character count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthClass {
    Short,
    Medium,
    Long,
}

impl LengthClass {
    pub const COUNT: usize = 3;

    pub const ALL: [LengthClass; Self::COUNT] =
        [LengthClass::Short, LengthClass::Medium, LengthClass::Long];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            LengthClass::Short => "short",
            LengthClass::Medium => "medium",
            LengthClass::Long => "long",
        }
    }
}

macro_rules! impl_id_traits {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.id() == s)
                    .ok_or_else(|| format!("unknown {}: {}", $what, s))
            }
        }
    };
}

impl_id_traits!(Relationship, "relationship");
impl_id_traits!(Style, "style");
impl_id_traits!(LengthClass, "length class");

/// One bucket coordinate in the relationship × style × length grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub relationship: Relationship,
    pub style: Style,
    pub length: LengthClass,
}

impl Cell {
    pub fn new(relationship: Relationship, style: Style, length: LengthClass) -> Self {
        Self {
            relationship,
            style,
            length,
        }
    }

    /// Every cell, in declaration order (relationship-major)
    pub fn all() -> impl Iterator<Item = Cell> {
        Relationship::ALL.into_iter().flat_map(|relationship| {
            Style::ALL.into_iter().flat_map(move |style| {
                LengthClass::ALL
                    .into_iter()
                    .map(move |length| Cell::new(relationship, style, length))
            })
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.relationship, self.style, self.length)
    }
}

/// Inclusive CJK-count range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

/// Count ranges for the three length classes
///
/// Counts that fall in no range (the gap zone) yield no length class and the
/// candidate is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRanges {
    pub short: CountRange,
    pub medium: CountRange,
    pub long: CountRange,
}

impl Default for LengthRanges {
    fn default() -> Self {
        Self {
            short: CountRange::new(0, 50),
            medium: CountRange::new(51, 240),
            long: CountRange::new(241, 600),
        }
    }
}

impl LengthRanges {
    pub fn range(&self, length: LengthClass) -> CountRange {
        match length {
            LengthClass::Short => self.short,
            LengthClass::Medium => self.medium,
            LengthClass::Long => self.long,
        }
    }

    /// Classify a CJK count, `None` in the gap zone
    pub fn classify(&self, count: usize) -> Option<LengthClass> {
        LengthClass::ALL
            .into_iter()
            .find(|length| self.range(*length).contains(count))
    }

    /// Ranges must be well-formed, ascending and non-overlapping
    pub fn validate(&self) -> Result<(), String> {
        for length in LengthClass::ALL {
            let range = self.range(length);
            if range.min > range.max {
                return Err(format!(
                    "{} range is empty: {}..={}",
                    length, range.min, range.max
                ));
            }
        }
        if self.short.max >= self.medium.min {
            return Err("short range overlaps medium range".to_string());
        }
        if self.medium.max >= self.long.min {
            return Err("medium range overlaps long range".to_string());
        }
        Ok(())
    }
}
