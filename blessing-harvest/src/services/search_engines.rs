//! Search engine adapters over Sogou
//!
//! - `WeixinSearch` (primary): WeChat public-account articles, which carry
//!   most of the long-form blessing collections
//! - `SogouWebSearch` (secondary): general web results, off-site links only
//!
//! Both fetch result pages through the shared `PageFetcher`, so request
//! headers and anti-automation detection live in one place.

use crate::services::http_fetcher::is_anti_spider_page;
use crate::types::{PageFetcher, SearchEngine, SearchError};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const WEIXIN_SEARCH_URL: &str = "https://weixin.sogou.com/weixin";
const WEIXIN_ORIGIN: &str = "https://weixin.sogou.com";
const SOGOU_WEB_SEARCH_URL: &str = "https://www.sogou.com/web";

static WEIXIN_RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.txt-box h3 a[href]").expect("valid selector"));
static WEB_RESULT_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.vrwrap a[href], div.rb a[href], h3 a[href]").expect("valid selector")
});

fn search_url(base: &str, params: &[(&str, &str)]) -> Result<String, SearchError> {
    Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| SearchError::Transport(crate::types::FetchError::Network(e.to_string())))
}

fn hrefs(document: &str, selector: &Selector) -> Vec<String> {
    let html = Html::parse_document(document);
    html.select(selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

/// Article links on a WeChat search result page
pub fn parse_weixin_results(document: &str) -> Vec<String> {
    hrefs(document, &WEIXIN_RESULT_LINK)
        .into_iter()
        .map(|href| {
            if href.starts_with("/link?") {
                format!("{}{}", WEIXIN_ORIGIN, href)
            } else {
                href
            }
        })
        .filter(|href| href.starts_with("http"))
        .collect()
}

/// Off-site links on a Sogou web result page
pub fn parse_web_results(document: &str) -> Vec<String> {
    hrefs(document, &WEB_RESULT_LINK)
        .into_iter()
        .filter(|href| href.starts_with("http") && !href.contains("sogou.com"))
        .collect()
}

pub struct WeixinSearch {
    fetcher: Arc<dyn PageFetcher>,
    pages: u32,
}

impl WeixinSearch {
    pub fn new(fetcher: Arc<dyn PageFetcher>, pages: u32) -> Self {
        Self { fetcher, pages }
    }
}

#[async_trait::async_trait]
impl SearchEngine for WeixinSearch {
    fn name(&self) -> &'static str {
        "weixin"
    }

    fn pages_per_query(&self) -> u32 {
        self.pages
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<String>, SearchError> {
        let page = page.to_string();
        let url = search_url(
            WEIXIN_SEARCH_URL,
            &[("type", "2"), ("query", query), ("page", &page)],
        )?;
        let document = self.fetcher.fetch(&url).await?;
        if is_anti_spider_page(&document) {
            return Err(SearchError::Blocked);
        }
        let links = parse_weixin_results(&document);
        debug!(engine = "weixin", query = %query, page = %page, links = links.len(), "Search page parsed");
        Ok(links)
    }
}

pub struct SogouWebSearch {
    fetcher: Arc<dyn PageFetcher>,
    pages: u32,
}

impl SogouWebSearch {
    pub fn new(fetcher: Arc<dyn PageFetcher>, pages: u32) -> Self {
        Self { fetcher, pages }
    }
}

#[async_trait::async_trait]
impl SearchEngine for SogouWebSearch {
    fn name(&self) -> &'static str {
        "sogou"
    }

    fn pages_per_query(&self) -> u32 {
        self.pages
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<String>, SearchError> {
        let page = page.to_string();
        let url = search_url(SOGOU_WEB_SEARCH_URL, &[("query", query), ("page", &page)])?;
        let document = self.fetcher.fetch(&url).await?;
        if is_anti_spider_page(&document) {
            return Err(SearchError::Blocked);
        }
        let links = parse_web_results(&document);
        debug!(engine = "sogou", query = %query, page = %page, links = links.len(), "Search page parsed");
        Ok(links)
    }
}
