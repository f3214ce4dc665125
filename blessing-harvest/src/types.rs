//! Collaborator traits for acquisition
//!
//! The orchestrator depends only on these three capabilities:
//! - **PageFetcher:** URL → document text
//! - **ContentExtractor:** document text → candidate strings
//! - **SearchEngine:** query + page → result URLs
//!
//! Concrete adapters live in `services::http_fetcher`,
//! `services::html_extractor` and `services::search_engines`; tests supply
//! in-memory mocks.

use thiserror::Error;

/// Failure that may be an anti-automation signal, retried with backoff
pub trait BlockSignal {
    fn is_blocked(&self) -> bool;
}

// ============================================================================
// Page Fetching
// ============================================================================

/// Fetch a document by URL
///
/// # Example
/// ```rust,ignore
/// use blessing_harvest::types::{FetchError, PageFetcher};
///
/// struct StaticFetcher(String);
///
/// #[async_trait::async_trait]
/// impl PageFetcher for StaticFetcher {
///     async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the decoded document body
    ///
    /// # Errors
    /// `FetchError::Blocked` signals anti-automation and is retried with
    /// backoff by the caller; every other error means "no candidates".
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Page fetch failure
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Anti-automation response (rate limit, captcha page)
    #[error("Blocked by anti-automation")]
    Blocked,

    /// Redirect page whose target could not be resolved
    #[error("Unresolvable redirect: {0}")]
    Redirect(String),
}

impl BlockSignal for FetchError {
    fn is_blocked(&self) -> bool {
        matches!(self, FetchError::Blocked)
    }
}

// ============================================================================
// Content Extraction
// ============================================================================

/// Split a document into candidate texts
pub trait ContentExtractor: Send + Sync {
    /// Candidate strings in document order, exact duplicates removed
    fn extract(&self, document: &str) -> Vec<String>;
}

// ============================================================================
// Search
// ============================================================================

/// One search engine, queried a page at a time
#[async_trait::async_trait]
pub trait SearchEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    /// Result pages requested per query
    fn pages_per_query(&self) -> u32;

    /// Result URLs on page `page` (1-based) for `query`
    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<String>, SearchError>;
}

/// Search failure
#[derive(Debug, Error)]
pub enum SearchError {
    /// Anti-automation response
    #[error("Search blocked by anti-automation")]
    Blocked,

    /// Result page could not be fetched
    #[error("Search transport error: {0}")]
    Transport(#[from] FetchError),
}

impl BlockSignal for SearchError {
    fn is_blocked(&self) -> bool {
        matches!(self, SearchError::Blocked | SearchError::Transport(FetchError::Blocked))
    }
}
