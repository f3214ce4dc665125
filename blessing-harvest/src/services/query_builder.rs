//! Search query generation per combination
//!
//! Each combination gets three synonym-expanded queries plus two queries
//! biased toward long-form texts (speeches, letters), which fill the long
//! length bucket that ordinary listicles rarely reach.

use crate::models::{Relationship, Style};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Extra words appended to the third synonym query
pub const EXTRA_WORDS: &[&str] = &["精选", "最新", "经典", "大全", "集锦"];

/// Long-form hints for the first long query
pub const LONG_HINTS: &[&str] = &["长篇", "感人", "贺词", "致辞", "一封信"];

pub fn relationship_synonyms(relationship: Relationship) -> &'static [&'static str] {
    match relationship {
        Relationship::Elder => &["长辈", "父母", "爸妈", "爷爷奶奶", "叔伯"],
        Relationship::Colleague => &["同事", "同仁", "工作伙伴"],
        Relationship::Leader => &["领导", "上级", "老板", "上司"],
        Relationship::Friend => &["朋友", "好友", "闺蜜", "兄弟", "哥们"],
        Relationship::Partner => &["恋人", "爱人", "老婆", "老公", "对象", "男朋友", "女朋友"],
        Relationship::Customer => &["客户", "合作伙伴", "甲方", "贵公司"],
    }
}

pub fn style_synonyms(style: Style) -> &'static [&'static str] {
    match style {
        Style::Formal => &["正式", "恭祝", "敬祝", "庄重", "典雅"],
        Style::Casual => &["轻松", "日常", "随意", "口语化", "亲切"],
        Style::Funny => &["搞笑", "幽默", "有趣", "沙雕", "段子"],
        Style::Literary => &["文艺", "诗意", "古风", "唯美", "散文"],
        Style::Brief => &["简短", "一句话", "简洁", "精简", "短句"],
    }
}

pub struct QueryBuilder {
    rng: StdRng,
}

impl QueryBuilder {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Two distinct synonyms in random order
    fn sample_pair(&mut self, pool: &'static [&'static str]) -> (&'static str, &'static str) {
        let mut picked: Vec<&'static str> = pool.to_vec();
        picked.shuffle(&mut self.rng);
        let first = picked.first().copied().unwrap_or_default();
        let second = picked.get(1).copied().unwrap_or(first);
        (first, second)
    }

    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Synonym-expanded queries (3)
    pub fn build_queries(&mut self, relationship: Relationship, style: Style) -> Vec<String> {
        let (rel_first, rel_last) = self.sample_pair(relationship_synonyms(relationship));
        let (style_first, style_last) = self.sample_pair(style_synonyms(style));
        let extra = self.pick(EXTRA_WORDS);

        vec![
            format!("春节祝福语 {} {} 大全", relationship.label(), style.label()),
            format!("新年祝福 {} {}", rel_first, style_first),
            format!("新春 {} {} 祝福语 {}", rel_last, style_last, extra),
        ]
    }

    /// Long-form biased queries (2)
    pub fn build_long_queries(&mut self, relationship: Relationship, style: Style) -> Vec<String> {
        let hint = self.pick(LONG_HINTS);
        vec![
            format!("春节 {} {} 祝福语 {}", relationship.label(), hint, style.label()),
            format!("新年 {} 长篇祝福 贺词", relationship.label()),
        ]
    }

    /// All five queries in search order
    pub fn queries_for(&mut self, relationship: Relationship, style: Style) -> Vec<String> {
        let mut queries = self.build_queries(relationship, style);
        queries.extend(self.build_long_queries(relationship, style));
        queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_query_uses_display_labels() {
        let mut builder = QueryBuilder::with_seed(3);
        let queries = builder.build_queries(Relationship::Leader, Style::Formal);
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "春节祝福语 领导 正式 大全");
    }

    #[test]
    fn test_synonym_queries_draw_from_vocabularies() {
        let mut builder = QueryBuilder::with_seed(11);
        for _ in 0..20 {
            let queries = builder.build_queries(Relationship::Partner, Style::Funny);
            let words: Vec<&str> = queries[1].split(' ').collect();
            assert_eq!(words[0], "新年祝福");
            assert!(relationship_synonyms(Relationship::Partner).contains(&words[1]));
            assert!(style_synonyms(Style::Funny).contains(&words[2]));

            let extra = queries[2].rsplit(' ').next().unwrap();
            assert!(EXTRA_WORDS.contains(&extra));
        }
    }

    #[test]
    fn test_same_seed_same_queries() {
        let a = QueryBuilder::with_seed(42).queries_for(Relationship::Friend, Style::Casual);
        let b = QueryBuilder::with_seed(42).queries_for(Relationship::Friend, Style::Casual);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert_eq!(a[4], "新年 朋友 长篇祝福 贺词");
    }
}
