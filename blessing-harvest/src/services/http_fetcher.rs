//! HTTP page fetcher
//!
//! reqwest client with browser-like default headers and a User-Agent drawn
//! per request from a small pool of desktop browsers.
//!
//! **Sogou redirect links:** `weixin.sogou.com/link?...` answers with a page
//! whose script assembles the article URL from fragments
//! (`url += 'https://mp.'; url += 'weixin.qq.c'; ...`). The fragments are
//! joined; failing that, the first direct `mp.weixin.qq.com/s` URL in the
//! page is used.
//!
//! **Decoding** (of the bytes already read, never a second request):
//! 1. Charset declared in `Content-Type` (unless ISO-8859-1, the HTTP default
//!    servers send when they know nothing)
//! 2. UTF-8
//! 3. `<meta charset>` sniffed from the document head
//! 4. GB18030 (superset of GBK and GB2312)
//! 5. Lossy UTF-8

use crate::config::HttpConfig;
use crate::types::{FetchError, PageFetcher};
use encoding_rs::{Encoding, GB18030};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Body markers of Sogou's rate-limit / captcha page
pub const ANTI_SPIDER_MARKERS: &[&str] = &["用户您好，您的访问过于频繁", "antispider"];

const SOGOU_REDIRECT_MARKER: &str = "weixin.sogou.com/link";

/// Bytes inspected for a `<meta charset>` declaration
const META_SNIFF_BYTES: usize = 4096;

static URL_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"url\s*\+=\s*'([^']*)'").expect("valid regex"));
static DIRECT_ARTICLE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(https?://mp\.weixin\.qq\.com/s[^\s"'<>]+)"#).expect("valid regex")
});
static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_\-]+)"#).expect("valid regex")
});

/// Whether a response body is an anti-automation page
pub fn is_anti_spider_page(body: &str) -> bool {
    ANTI_SPIDER_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Article URL embedded in a Sogou redirect page
pub fn resolve_sogou_redirect(body: &str) -> Option<String> {
    let joined: String = URL_FRAGMENT
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();
    if joined.starts_with("http") {
        return Some(joined);
    }

    DIRECT_ARTICLE_URL
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Charset named by a `<meta>` tag in the document head
pub fn sniff_meta_charset(head: &str) -> Option<String> {
    META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Charset parameter of a `Content-Type` value, lowercased
pub fn content_type_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|part| part.trim().to_ascii_lowercase())
        .find_map(|part| {
            part.strip_prefix("charset=")
                .map(|cs| cs.trim().trim_matches('"').to_string())
        })
        .filter(|cs| !cs.is_empty())
}

fn declared_charset(response: &Response) -> Option<String> {
    let content_type = response.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    content_type_charset(content_type)
}

fn decode_with_label(bytes: &[u8], label: &str) -> Option<String> {
    let encoding = Encoding::for_label(label.trim().as_bytes())?;
    let (text, _, _) = encoding.decode(bytes);
    Some(text.into_owned())
}

/// Decode a response body
///
/// `declared` is the `Content-Type` charset, if any.
pub fn decode_body(bytes: &[u8], declared: Option<&str>) -> String {
    if let Some(text) = declared
        .filter(|cs| *cs != "iso-8859-1")
        .and_then(|cs| decode_with_label(bytes, cs))
    {
        return text;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SNIFF_BYTES)]);
    if let Some(text) = sniff_meta_charset(&head).and_then(|cs| decode_with_label(bytes, &cs)) {
        return text;
    }

    let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
    if !had_errors {
        return text.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    fn user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, Self::user_agent())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(FetchError::Blocked),
            status if !status.is_success() => Err(FetchError::Status(status.as_u16())),
            _ => Ok(response),
        }
    }

    async fn read_body(&self, url: &str, response: Response) -> Result<String, FetchError> {
        let declared = declared_charset(&response);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        debug!(url = %url, bytes = bytes.len(), charset = ?declared, "Response body read");
        Ok(decode_body(&bytes, declared.as_deref()))
    }

    async fn resolve_redirect(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        let body = self.read_body(url, response).await?;
        if is_anti_spider_page(&body) {
            return Err(FetchError::Blocked);
        }
        resolve_sogou_redirect(&body).ok_or_else(|| FetchError::Redirect(url.to_string()))
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = if url.contains(SOGOU_REDIRECT_MARKER) {
            let resolved = self.resolve_redirect(url).await?;
            debug!(from = %url, to = %resolved, "Resolved Sogou redirect");
            resolved
        } else {
            url.to_string()
        };

        let response = self.get(&target).await?;
        let body = self.read_body(&target, response).await?;
        if is_anti_spider_page(&body) {
            return Err(FetchError::Blocked);
        }
        Ok(body)
    }
}
