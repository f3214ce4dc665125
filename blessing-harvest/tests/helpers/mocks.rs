//! In-memory collaborators with call recording

use blessing_harvest::types::{
    ContentExtractor, FetchError, PageFetcher, SearchEngine, SearchError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Body(String),
    Blocked,
    Status(u16),
}

/// Serves canned documents by URL; unknown URLs answer 404
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), MockResponse::Body(body.into()));
        self
    }

    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.pages.insert(url.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait::async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Blocked) => Err(FetchError::Blocked),
            Some(MockResponse::Status(code)) => Err(FetchError::Status(*code)),
            None => Err(FetchError::Status(404)),
        }
    }
}

/// One candidate per non-empty line
#[derive(Debug, Default)]
pub struct LineExtractor;

impl ContentExtractor for LineExtractor {
    fn extract(&self, document: &str) -> Vec<String> {
        document
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Returns the same result URLs on page 1 for every query
pub struct MockSearch {
    name: &'static str,
    pages: u32,
    results: Vec<String>,
    blocked: bool,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new(name: &'static str, pages: u32) -> Self {
        Self {
            name,
            pages,
            results: Vec::new(),
            blocked: false,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_results(mut self, urls: &[&str]) -> Self {
        self.results = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn always_blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchEngine for MockSearch {
    fn name(&self) -> &'static str {
        self.name
    }

    fn pages_per_query(&self) -> u32 {
        self.pages
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<String>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if self.blocked {
            return Err(SearchError::Blocked);
        }
        if page == 1 {
            Ok(self.results.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

/// Cancels the token on its first search, simulating Ctrl+C mid-combination
pub struct CancellingSearch {
    token: CancellationToken,
    calls: AtomicUsize,
}

impl CancellingSearch {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SearchEngine for CancellingSearch {
    fn name(&self) -> &'static str {
        "cancelling"
    }

    fn pages_per_query(&self) -> u32 {
        3
    }

    async fn search_page(&self, _query: &str, _page: u32) -> Result<Vec<String>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        Ok(Vec::new())
    }
}
