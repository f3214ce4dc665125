//! Admitted blessing item

use serde::{Deserialize, Serialize};

/// A blessing admitted into exactly one bucket
///
/// Created once on admission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlessingItem {
    /// Cleaned blessing text
    pub text: String,
    /// CJK ideograph count of `text` (drives the length class)
    pub char_count: usize,
    /// Page the text was extracted from
    #[serde(alias = "source")]
    pub source_url: String,
}

impl BlessingItem {
    pub fn new(text: impl Into<String>, char_count: usize, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            char_count,
            source_url: source_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_source_field_is_accepted() {
        let json = r#"{"text":"新年快乐","char_count":4,"source":"https://example.com"}"#;
        let item: BlessingItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.source_url, "https://example.com");
    }

    #[test]
    fn test_serializes_source_url_field() {
        let item = BlessingItem::new("新年快乐", 4, "https://example.com");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["source_url"], "https://example.com");
        assert!(json.get("source").is_none());
    }
}
