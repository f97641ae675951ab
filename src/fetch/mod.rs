// src/fetch/mod.rs
// =============================================================================
// The page-loading capability the crawl and scrape stages depend on.
//
// Submodules:
// - html: pure HTML parsing (links and selector text)
// - http: HttpPageFetcher, the reqwest-backed implementation
//
// The core only ever talks to the PageFetcher trait, so tests swap in a
// map-backed stub and never touch the network.
// =============================================================================

mod html;
mod http;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::HttpPageFetcher;

/// Loads pages for the traversal and scrape stages
///
/// Both calls may fail; failures are ordinary `Err` values that the caller
/// recovers from per URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Every link on the page, raw and unfiltered
    async fn links(&self, url: &str) -> Result<Vec<String>, FetchError>;

    /// Newline-joined text of the elements matched by `selectors`, in
    /// document order
    async fn text(&self, url: &str, selectors: &[String]) -> Result<String, FetchError>;
}
