//! Built-in seed sources
//!
//! Hand-curated pages known to carry blessing collections. Per-relationship
//! seeds are replayed with forced labels when search leaves a combination
//! short; bulk-only seeds are mixed-audience articles used by the bulk phase.

use crate::models::Relationship;
use std::collections::BTreeSet;

const BULK_ONLY_SEEDS: &[&str] = &[
    "https://mp.weixin.qq.com/s/TP4rcv1vHXy2AJgVMpHGyA",
    "https://mp.weixin.qq.com/s/36ynLsBhuq_G55AlutxCuQ",
    "https://mp.weixin.qq.com/s/5p5SlE7bUKhKnuYfbfbWNg",
    "https://mp.weixin.qq.com/s/OqcfiDEX44J4YtTwGs9QMA",
    "https://mp.weixin.qq.com/s/bREG9D3GCcozXx_8D6d-fw",
];

fn builtin_relationship_seeds(relationship: Relationship) -> &'static [&'static str] {
    match relationship {
        Relationship::Elder => &[
            "https://www.ruiwen.com/zhufuyu/chunjie/",
            "https://www.yjbys.com/heci/3568093.html",
            "https://www.duanmeiwen.com/zhufuyu/4451508.html",
            "https://www.163.com/dy/article/JM3GSVVT0556BB8F.html",
            "https://m.thepaper.cn/newsDetail_forward_26329501",
        ],
        Relationship::Colleague => &[
            "https://www.ruiwen.com/zhufuyu/chunjie/",
            "https://fanwen.hao86.com/zhufuyu/235083.html",
            "https://www.duanmeiwen.com/zhufuyu/4451508.html",
            "https://www.163.com/dy/article/JM3GSVVT0556BB8F.html",
        ],
        Relationship::Leader => &[
            "https://www.ruiwen.com/zhufuyu/chunjie/",
            "https://www.163.com/dy/article/JM3GSVVT0556BB8F.html",
            "https://m.thepaper.cn/newsDetail_forward_26329501",
            "https://www.juzimi.com.cn/zhufuyu/chunjiezhufuyu/867587.html",
        ],
        Relationship::Friend => &[
            "https://www.ruiwen.com/zhufuyu/chunjie/",
            "https://www.duanmeiwen.com/zhufuyu/4451508.html",
            "https://www.163.com/dy/article/JM3GSVVT0556BB8F.html",
        ],
        Relationship::Partner => &[
            "https://www.ruiwen.com/zhufuyu/chunjie/",
            "https://www.yjbys.com/juzi/weimei/15317.html",
            "https://www.163.com/dy/article/JM3GSVVT0556BB8F.html",
        ],
        Relationship::Customer => &[
            "https://www.ruiwen.com/zhufuyu/chunjie/",
            "https://m.thepaper.cn/newsDetail_forward_26329501",
            "https://www.163.com/dy/article/JM3GSVVT0556BB8F.html",
            "https://news.sina.cn/2018-02-15/detail-ifyrrhct8366311.d.html",
        ],
    }
}

/// Seed URLs per relationship plus bulk-only seeds
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    per_relationship: [Vec<String>; Relationship::COUNT],
    bulk_only: Vec<String>,
}

impl SeedCatalog {
    pub fn builtin() -> Self {
        Self {
            per_relationship: Relationship::ALL
                .map(|rel| builtin_relationship_seeds(rel).iter().map(|s| s.to_string()).collect()),
            bulk_only: BULK_ONLY_SEEDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Catalog with no seeds at all
    pub fn empty() -> Self {
        Self {
            per_relationship: Default::default(),
            bulk_only: Vec::new(),
        }
    }

    pub fn with_relationship_seeds(mut self, relationship: Relationship, urls: Vec<String>) -> Self {
        self.per_relationship[relationship.index()] = urls;
        self
    }

    pub fn with_bulk_seeds(mut self, urls: Vec<String>) -> Self {
        self.bulk_only = urls;
        self
    }

    pub fn for_relationship(&self, relationship: Relationship) -> &[String] {
        &self.per_relationship[relationship.index()]
    }

    /// Every distinct seed URL, sorted
    pub fn bulk_urls(&self) -> Vec<String> {
        self.per_relationship
            .iter()
            .flatten()
            .chain(self.bulk_only.iter())
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}

impl Default for SeedCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_urls_are_unique_and_sorted() {
        let catalog = SeedCatalog::builtin();
        let urls = catalog.bulk_urls();

        let mut sorted = urls.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(urls, sorted);
        // The shared ruiwen page appears under every relationship but once here
        assert_eq!(
            urls.iter().filter(|u| u.contains("ruiwen.com")).count(),
            1
        );
        assert!(urls.iter().any(|u| u.contains("mp.weixin.qq.com")));
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = SeedCatalog::empty()
            .with_relationship_seeds(Relationship::Friend, vec!["b".into(), "a".into()])
            .with_bulk_seeds(vec!["a".into(), "c".into()]);
        assert_eq!(catalog.bulk_urls(), vec!["a", "b", "c"]);
        assert_eq!(catalog.for_relationship(Relationship::Friend), ["b", "a"]);
        assert!(catalog.for_relationship(Relationship::Elder).is_empty());
    }
}
