//! Keyword-scoring classifier for relationship and style
//!
//! **Algorithm:**
//! 1. Style: texts with at most `brief_max_cjk` CJK chars are `Brief`
//!    regardless of content. Otherwise every non-brief style is scored by the
//!    number of its indicator keywords present in the text.
//! 2. Relationship: every relationship is scored the same way.
//! 3. The strictly highest positive score wins. Equal scores resolve to the
//!    label declared first in the enum. No positive score yields `None`.
//!
//! Candidates are visited in `ALL` order and only a strictly greater score
//! replaces the current best, so the tie-break never depends on hashing or
//! map iteration.

use crate::models::{Relationship, Style};
use crate::services::text_normalizer::count_cjk;

/// Default CJK count at or below which a text is classified `Brief`
pub const DEFAULT_BRIEF_MAX_CJK: usize = 36;

/// Indicator keywords per style (`Brief` is decided by length only)
pub fn style_indicators(style: Style) -> &'static [&'static str] {
    match style {
        Style::Formal => &["恭祝", "敬祝", "谨祝", "恭贺", "敬贺", "谨此", "惠存"],
        Style::Casual => &["呀", "啦", "嘛", "哈", "吧", "嘿", "哟", "噢", "耶"],
        Style::Funny => &[
            "哈哈", "笑", "段子", "搞", "梗", "沙雕", "红包", "马上有钱", "马上有对象", "算了",
            "别问", "偷偷",
        ],
        Style::Literary => &[
            "诗", "词", "韵", "岁月", "光阴", "山河", "烟火", "星辰", "明月", "清风", "远方",
            "彼岸", "流年", "画卷",
        ],
        Style::Brief => &[],
    }
}

/// Indicator keywords per relationship
pub fn relationship_indicators(relationship: Relationship) -> &'static [&'static str] {
    match relationship {
        Relationship::Elder => &[
            "长辈", "父母", "爸", "妈", "爷爷", "奶奶", "外公", "外婆", "叔", "伯", "姑", "姨",
            "健康长寿", "身体安康", "福寿",
        ],
        Relationship::Colleague => &["同事", "同仁", "工作", "合作", "并肩", "共事", "团队"],
        Relationship::Leader => &["领导", "上级", "老板", "指导", "带领", "栽培", "提携"],
        Relationship::Friend => &[
            "朋友", "好友", "兄弟", "闺蜜", "哥们", "姐妹", "铁子", "友谊", "友情",
        ],
        Relationship::Partner => &[
            "爱", "恋", "亲爱", "宝贝", "老婆", "老公", "甜蜜", "浪漫", "陪伴", "在一起", "牵手",
            "情人",
        ],
        Relationship::Customer => &[
            "客户", "贵公司", "贵司", "合作", "商祺", "业务", "合作伙伴", "携手", "共创", "共赢",
        ],
    }
}

/// Number of distinct indicator keywords present in `text`
fn score(text: &str, indicators: &[&str]) -> usize {
    indicators.iter().filter(|kw| text.contains(*kw)).count()
}

/// Highest positive score wins; first candidate wins ties
fn best_by_score<T, I, F>(candidates: I, score_of: F) -> Option<T>
where
    T: Copy,
    I: IntoIterator<Item = T>,
    F: Fn(T) -> usize,
{
    let mut best: Option<(T, usize)> = None;
    for candidate in candidates {
        let s = score_of(candidate);
        if s == 0 {
            continue;
        }
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((candidate, s)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Labels detected for a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub relationship: Option<Relationship>,
    pub style: Option<Style>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    brief_max_cjk: usize,
}

impl Classifier {
    pub fn new(brief_max_cjk: usize) -> Self {
        Self { brief_max_cjk }
    }

    pub fn detect_style(&self, text: &str) -> Option<Style> {
        if count_cjk(text) <= self.brief_max_cjk {
            return Some(Style::Brief);
        }

        best_by_score(
            Style::ALL.into_iter().filter(|s| *s != Style::Brief),
            |style| score(text, style_indicators(style)),
        )
    }

    pub fn detect_relationship(&self, text: &str) -> Option<Relationship> {
        best_by_score(Relationship::ALL, |rel| {
            score(text, relationship_indicators(rel))
        })
    }

    pub fn classify(&self, text: &str) -> Classification {
        Classification {
            relationship: self.detect_relationship(text),
            style: self.detect_style(text),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_BRIEF_MAX_CJK)
    }
}
