// src/fetch/http.rs
// =============================================================================
// HttpPageFetcher: loads pages with reqwest and hands the HTML to the pure
// helpers in html.rs.
//
// Key behaviour:
// - One shared Client (connection pooling), cloned cheaply per request
// - Per-request timeout and a bounded redirect policy
// - Non-2xx responses are failures, not empty pages
// - Links resolve against the final URL after redirects
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::html::{extract_links, extract_text};
use super::PageFetcher;
use crate::config::HarvestConfig;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    // Builds the fetcher from configuration
    //
    // Fails only if reqwest cannot initialise its TLS backend.
    pub fn new(config: &HarvestConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    // Fetches a page and returns (final_url, html)
    async fn fetch_page(&self, url: &str) -> Result<(Url, String), FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let html = response.text().await?;
        debug!(url, final_url = %final_url, bytes = html.len(), "fetched page");

        Ok((final_url, html))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn links(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let (final_url, html) = self.fetch_page(url).await?;
        Ok(extract_links(&html, &final_url))
    }

    async fn text(&self, url: &str, selectors: &[String]) -> Result<String, FetchError> {
        let (_, html) = self.fetch_page(url).await?;
        extract_text(&html, selectors)
    }
}
