// src/pipeline.rs
// =============================================================================
// The single entry point: validate a request, discover URLs, scrape them.
//
// Order of work:
// 1. Reject bad requests (zero depth, depth over the bound, unparseable seed)
//    before any page is fetched
// 2. Traverse from the seed (depth 1 skips straight to [seed])
// 3. Scrape the discovered URLs with bounded concurrency
//
// Steps 2 and 3 share one time budget. When it runs out the in-flight
// futures are dropped, which cancels their requests, and the caller gets
// HarvestError::Timeout. Pages that had already finished are discarded too:
// a timed-out harvest never returns a partial corpus.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::config::HarvestConfig;
use crate::crawl::{traverse, StopReason, TraversalReport};
use crate::error::{FailedPage, HarvestError};
use crate::fetch::PageFetcher;
use crate::rules::RuleSet;
use crate::scrape::{scrape, ScrapeReport, ScrapedPage};

/// One crawl-plus-scrape request, as received over HTTP or built by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestRequest {
    /// Seed URL
    pub url: String,
    /// Page budget, seed included
    pub depth: usize,
    #[serde(default)]
    pub rules: RuleSet,
}

/// Limits applied to every request
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub max_depth: usize,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl From<&HarvestConfig> for HarvestOptions {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            concurrency: config.concurrency,
            timeout: config.pipeline_timeout(),
        }
    }
}

/// Distinguishes "nothing matched" from "nothing could be fetched"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestOutcome {
    /// At least one page produced text
    Collected,
    /// Every page loaded but no selector matched anything
    Empty,
    /// No text, and at least one page could not be fetched
    Failed,
}

/// Which stage a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Traversal,
    Scrape,
}

/// A failed URL together with the stage that reported it
#[derive(Debug, Serialize)]
pub struct StageFailure<'a> {
    pub stage: FailureStage,
    #[serde(flatten)]
    pub page: &'a FailedPage,
}

/// The wire shape of a full report: `?detailed=true` and `crawl --json`
#[derive(Debug, Serialize)]
pub struct DetailedReport<'a> {
    pub outcome: HarvestOutcome,
    pub urls: &'a [String],
    pub stop_reason: StopReason,
    pub pages: &'a [ScrapedPage],
    pub failures: Vec<StageFailure<'a>>,
}

#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub outcome: HarvestOutcome,
    pub traversal: TraversalReport,
    pub scrape: ScrapeReport,
}

impl HarvestReport {
    fn new(traversal: TraversalReport, scrape: ScrapeReport) -> Self {
        let outcome = if scrape.succeeded.iter().any(|page| !page.text.is_empty()) {
            HarvestOutcome::Collected
        } else if scrape.failed.is_empty() {
            HarvestOutcome::Empty
        } else {
            HarvestOutcome::Failed
        };

        Self {
            outcome,
            traversal,
            scrape,
        }
    }

    /// The legacy response body: texts only, failures dropped
    pub fn texts(&self) -> Vec<String> {
        self.scrape.texts()
    }

    pub fn pages(&self) -> &[ScrapedPage] {
        &self.scrape.succeeded
    }

    /// Every failure from both stages, labelled with its stage
    ///
    /// A URL that failed in both stages shows up once per stage.
    pub fn failures(&self) -> impl Iterator<Item = (FailureStage, &FailedPage)> {
        let traversal = self.traversal.failures.iter().map(|f| (FailureStage::Traversal, f));
        let scrape = self.scrape.failed.iter().map(|f| (FailureStage::Scrape, f));
        traversal.chain(scrape)
    }

    pub fn detailed(&self) -> DetailedReport<'_> {
        DetailedReport {
            outcome: self.outcome,
            urls: &self.traversal.urls,
            stop_reason: self.traversal.stop_reason,
            pages: self.pages(),
            failures: self
                .failures()
                .map(|(stage, page)| StageFailure { stage, page })
                .collect(),
        }
    }

    /// Number of distinct URLs that failed in either stage
    pub fn failed_urls(&self) -> usize {
        self.failures()
            .map(|(_, f)| f.url.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

// Checks a request against the boundary policy
pub fn validate(request: &HarvestRequest, max_depth: usize) -> Result<(), HarvestError> {
    if request.depth == 0 {
        return Err(HarvestError::InvalidDepth);
    }
    if request.depth > max_depth {
        return Err(HarvestError::DepthExceeded {
            requested: request.depth,
            max: max_depth,
        });
    }
    Url::parse(&request.url).map_err(|e| HarvestError::InvalidSeed {
        url: request.url.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}

// Runs only the traversal stage, under the same validation and time budget
pub async fn discover<F>(
    request: &HarvestRequest,
    fetcher: &F,
    options: &HarvestOptions,
) -> Result<TraversalReport, HarvestError>
where
    F: PageFetcher + ?Sized,
{
    validate(request, options.max_depth)?;

    let work = traverse(&request.url, request.depth, &request.rules, fetcher);
    with_budget(options.timeout, work).await
}

// Runs traversal then scraping for one request
pub async fn harvest<F>(
    request: &HarvestRequest,
    fetcher: &F,
    options: &HarvestOptions,
) -> Result<HarvestReport, HarvestError>
where
    F: PageFetcher + ?Sized,
{
    validate(request, options.max_depth)?;

    info!(seed = %request.url, depth = request.depth, "starting harvest");

    let work = async {
        let traversal = traverse(&request.url, request.depth, &request.rules, fetcher).await;
        let scraped = scrape(
            traversal.urls.clone(),
            &request.rules,
            fetcher,
            options.concurrency,
        )
        .await;
        HarvestReport::new(traversal, scraped)
    };

    let report = with_budget(options.timeout, work).await?;

    info!(
        seed = %request.url,
        attempted = report.scrape.attempted(),
        pages = report.scrape.succeeded.len(),
        failed_urls = report.failed_urls(),
        outcome = ?report.outcome,
        "harvest finished"
    );

    Ok(report)
}

async fn with_budget<T>(
    budget: Duration,
    work: impl std::future::Future<Output = T>,
) -> Result<T, HarvestError> {
    tokio::time::timeout(budget, work).await.map_err(|_| {
        warn!(?budget, "harvest budget exhausted, cancelling outstanding fetches");
        HarvestError::Timeout(budget)
    })
}
