// src/scrape/gather.rs
// =============================================================================
// Scatter-gather page scraping.
//
// Scatter: one fetch-and-extract future per URL.
// Gather: buffer_unordered runs at most `concurrency` of them at once and
// yields outcomes as they complete, each still paired with its URL.
//
// A failed page never cancels its siblings. It lands in `failed` and the rest
// of the batch carries on.
// =============================================================================

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FailedPage, FetchError};
use crate::fetch::PageFetcher;
use crate::rules::RuleSet;

/// Text harvested from one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedPage {
    pub url: String,
    pub text: String,
}

/// Every outcome of a scrape, in completion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeReport {
    pub succeeded: Vec<ScrapedPage>,
    pub failed: Vec<FailedPage>,
}

impl ScrapeReport {
    /// Texts only, without URLs
    pub fn texts(&self) -> Vec<String> {
        self.succeeded.iter().map(|page| page.text.clone()).collect()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

// Scrapes every URL with bounded concurrency
//
// Parameters:
//   urls: pages to scrape (usually a traversal result)
//   rules: supplies the selectors applied to each page
//   fetcher: loads and evaluates each page
//   concurrency: maximum in-flight fetches, 0 is treated as 1
//
// Returns once every dispatched fetch has completed or failed.
pub async fn scrape<F>(urls: Vec<String>, rules: &RuleSet, fetcher: &F, concurrency: usize) -> ScrapeReport
where
    F: PageFetcher + ?Sized,
{
    let selectors = rules.selectors();
    let selectors = selectors.as_slice();
    let total = urls.len();

    let tasks: Vec<_> = urls
        .into_iter()
        .map(|url| scrape_one(fetcher, url, selectors))
        .collect();

    let outcomes: Vec<_> = stream::iter(tasks)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = ScrapeReport::default();
    for (url, outcome) in outcomes {
        match outcome {
            Ok(text) => {
                debug!(url = %url, chars = text.len(), "scraped page");
                report.succeeded.push(ScrapedPage { url, text });
            }
            Err(e) => {
                warn!(url = %url, error = %e, "failed to scrape page, omitting it");
                report.failed.push(FailedPage::new(url, &e));
            }
        }
    }

    info!(
        total,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "scrape finished"
    );

    report
}

async fn scrape_one<F>(fetcher: &F, url: String, selectors: &[String]) -> (String, Result<String, FetchError>)
where
    F: PageFetcher + ?Sized,
{
    let outcome = fetcher.text(&url, selectors).await;
    (url, outcome)
}
