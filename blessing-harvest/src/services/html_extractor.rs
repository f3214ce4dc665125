//! HTML candidate extraction
//!
//! Blessing sites are mostly numbered lists, so the extractor reads a page
//! four ways and merges the results:
//! 1. `li` texts
//! 2. `p` texts, split on inline list markers (`1、`, `二.`, `3)`)
//! 3. Content-looking `div`s (class mentions content/text/article/...), one
//!    candidate per text line with its number prefix stripped
//! 4. `strong` / `b` texts
//!
//! Text under `script, style, nav, footer, header, aside, form` is ignored.
//! Candidates need at least 4 CJK chars; exact repeats keep their first
//! position.

use crate::services::text_normalizer::count_cjk;
use crate::types::ContentExtractor;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside", "form"];

/// Minimum CJK chars for a string to be a candidate
pub const MIN_CANDIDATE_CJK: usize = 4;

static LI: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid selector"));
static P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div[class]").expect("valid selector"));
static EMPHASIS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("strong, b").expect("valid selector"));

static INLINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d一二三四五六七八九十]+[、.．）)]\s*").expect("valid regex"));
static LINE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d一二三四五六七八九十]+[、.．）)\.]?\s*").expect("valid regex"));
static CONTENT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)content|text|article|blessing|item|card|post|entry|body").expect("valid regex")
});

fn is_excluded(element: ElementRef<'_>) -> bool {
    EXCLUDED_TAGS.contains(&element.value().name())
}

/// Trimmed, non-empty text nodes under `element` outside excluded subtrees
fn visible_pieces<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(is_excluded);
            if hidden {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect()
}

/// Ordered, exact-deduplicated candidate list
#[derive(Default)]
struct Candidates {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl Candidates {
    fn add(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || count_cjk(text) < MIN_CANDIDATE_CJK {
            return;
        }
        if self.seen.insert(text.to_string()) {
            self.ordered.push(text.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ContentExtractor for HtmlExtractor {
    fn extract(&self, document: &str) -> Vec<String> {
        let html = Html::parse_document(document);
        let mut candidates = Candidates::default();

        for li in html.select(&LI) {
            candidates.add(&visible_pieces(li).concat());
        }

        for p in html.select(&P) {
            let text = visible_pieces(p).concat();
            for part in INLINE_MARKER.split(&text) {
                candidates.add(part);
            }
        }

        for div in html.select(&DIV) {
            let content_like = div
                .value()
                .attr("class")
                .is_some_and(|class| CONTENT_CLASS.is_match(class));
            if !content_like {
                continue;
            }
            for piece in visible_pieces(div) {
                for line in piece.lines() {
                    candidates.add(&LINE_PREFIX.replace(line.trim(), ""));
                }
            }
        }

        for tag in html.select(&EMPHASIS) {
            candidates.add(&visible_pieces(tag).concat());
        }

        candidates.ordered
    }
}
