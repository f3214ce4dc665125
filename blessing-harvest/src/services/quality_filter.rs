//! Quality filter for blessing candidates
//!
//! A candidate is admitted when:
//! 1. Its CJK count is within the configured bounds (default 6..=700)
//! 2. At least N distinct blessing keywords occur in it (default 2)
//! 3. No noise pattern matches (ads, navigation, boilerplate, URLs, prompts)
//!
//! The noise check is a veto regardless of keyword score. Apply after
//! `clean_candidate`.

use crate::config::QualityConfig;
use crate::services::text_normalizer::count_cjk;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Vocabulary whose presence marks a text as a blessing
pub const BLESSING_KEYWORDS: &[&str] = &[
    "祝", "愿", "新春", "快乐", "福", "吉", "顺", "安康", "如意", "幸福", "美满", "恭", "贺",
    "大吉", "新年", "春节", "马年", "丙午", "拜年", "团圆", "红包", "万事", "平安", "健康", "发财",
    "兴旺",
];

/// Noise patterns, checked in order
static NOISE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("copyright", r"(?i)版权|©|copyright"),
        ("registration", r"备案号|ICP|京公网"),
        ("call_to_action", r"点击|下载|关注|扫码|二维码|微信公众号"),
        ("advertising", r"(?i)广告|推广|赞助|sponsored"),
        ("navigation", r"导航|首页|上一页|下一页|返回"),
        ("account", r"登录|注册|会员|VIP"),
        ("url", r"https?://\S+"),
        ("attribution", r"原文链接|转载|来源[:：]"),
        ("social", r"评论|回复|分享到"),
        ("read_more", r"阅读全文|展开全部|查看更多"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid noise regex")))
    .collect()
});

/// Outcome of the quality check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterVerdict {
    Accepted,
    Empty,
    TooShort,
    TooLong,
    TooFewKeywords,
    /// Name of the first noise pattern that matched
    Noise(&'static str),
}

impl FilterVerdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, FilterVerdict::Accepted)
    }
}

/// Number of distinct blessing keywords present
pub fn keyword_hits(text: &str) -> usize {
    BLESSING_KEYWORDS.iter().filter(|kw| text.contains(*kw)).count()
}

/// Name of the first matching noise pattern, if any
pub fn noise_match(text: &str) -> Option<&'static str> {
    NOISE_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
}

#[derive(Debug, Clone)]
pub struct QualityFilter {
    min_cjk: usize,
    max_cjk: usize,
    min_keyword_hits: usize,
}

impl QualityFilter {
    pub fn new(config: &QualityConfig) -> Self {
        Self {
            min_cjk: config.min_cjk,
            max_cjk: config.max_cjk,
            min_keyword_hits: config.min_keyword_hits,
        }
    }

    pub fn evaluate(&self, text: &str) -> FilterVerdict {
        if text.is_empty() {
            return FilterVerdict::Empty;
        }

        let cjk = count_cjk(text);
        if cjk < self.min_cjk {
            return FilterVerdict::TooShort;
        }
        if cjk > self.max_cjk {
            return FilterVerdict::TooLong;
        }

        if keyword_hits(text) < self.min_keyword_hits {
            return FilterVerdict::TooFewKeywords;
        }

        match noise_match(text) {
            Some(name) => FilterVerdict::Noise(name),
            None => FilterVerdict::Accepted,
        }
    }

    pub fn is_acceptable(&self, text: &str) -> bool {
        self.evaluate(text).is_accepted()
    }
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(&QualityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_blessing() {
        let filter = QualityFilter::default();
        assert_eq!(filter.evaluate("祝您新春快乐，万事如意"), FilterVerdict::Accepted);
    }

    #[test]
    fn test_rejects_empty_and_short() {
        let filter = QualityFilter::default();
        assert_eq!(filter.evaluate(""), FilterVerdict::Empty);
        assert_eq!(filter.evaluate("新年快乐"), FilterVerdict::TooShort);
    }

    #[test]
    fn test_rejects_over_upper_bound() {
        let filter = QualityFilter::default();
        let text = format!("祝福新年{}", "好".repeat(697));
        assert_eq!(count_cjk(&text), 701);
        assert_eq!(filter.evaluate(&text), FilterVerdict::TooLong);

        let at_bound = format!("祝福新年{}", "好".repeat(696));
        assert_eq!(filter.evaluate(&at_bound), FilterVerdict::Accepted);
    }

    #[test]
    fn test_requires_two_distinct_keywords() {
        let filter = QualityFilter::default();
        // Only "快乐" present, repeated
        assert_eq!(filter.evaluate("今天真是快乐快乐的日子"), FilterVerdict::TooFewKeywords);
    }

    #[test]
    fn test_noise_is_a_veto() {
        let filter = QualityFilter::default();
        assert_eq!(
            filter.evaluate("祝您新春快乐万事如意，点击关注领取红包"),
            FilterVerdict::Noise("call_to_action")
        );
        assert_eq!(
            filter.evaluate("祝您新春快乐万事如意 https://example.com/a"),
            FilterVerdict::Noise("url")
        );
        assert_eq!(
            filter.evaluate("祝您新春快乐万事如意 Copyright 2026"),
            FilterVerdict::Noise("copyright")
        );
    }
}
