// src/crawl/queue.rs
// =============================================================================
// The traversal engine: breadth-first link discovery from a seed URL.
//
// How it works:
// 1. Start with the seed in the frontier queue
// 2. Pop the next URL nobody has expanded yet and fetch its links
// 3. Run the links through the Link Filter and record them in `seen`
// 4. Queue only links that were new to `seen`
// 5. Stop when `seen` reaches the depth bound, when an iteration discovers
//    nothing new (stagnation), or when the frontier runs dry
//
// "depth" here is a page budget, not a hop count: the result holds at most
// `depth` URLs, the seed first.
//
// All state (frontier, seen, visited) lives on the stack of one traverse()
// call. Concurrent crawls never share it.
// =============================================================================

use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

use super::filter::filter_links;
use crate::error::FailedPage;
use crate::fetch::PageFetcher;
use crate::rules::RuleSet;

/// Why the traversal loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// depth <= 1, nothing was fetched
    SeedOnly,
    /// `seen` reached the depth bound
    DepthReached,
    /// The last iteration added no new URL
    Stagnated,
    /// No unvisited URL left in the frontier
    FrontierExhausted,
}

/// Outcome of one traversal
#[derive(Debug, Clone, Serialize)]
pub struct TraversalReport {
    /// Seed first, then discovered URLs, never more than `depth` entries
    pub urls: Vec<String>,
    /// Pages whose links could not be fetched (they contributed no links)
    pub failures: Vec<FailedPage>,
    pub pages_visited: usize,
    pub stop_reason: StopReason,
}

impl TraversalReport {
    fn seed_only(seed: &str) -> Self {
        Self {
            urls: vec![seed.to_string()],
            failures: Vec::new(),
            pages_visited: 0,
            stop_reason: StopReason::SeedOnly,
        }
    }
}

// Insertion-ordered set of discovered URLs
//
// The order only makes runs reproducible; callers must not rely on anything
// past element 0 of the result.
#[derive(Debug, Default)]
struct Seen {
    order: Vec<String>,
    members: HashSet<String>,
}

impl Seen {
    // Returns true if the URL was not seen before
    fn insert(&mut self, url: &str) -> bool {
        if self.members.contains(url) {
            return false;
        }
        self.members.insert(url.to_string());
        self.order.push(url.to_string());
        true
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn into_ordered(self) -> Vec<String> {
        self.order
    }
}

// Crawls breadth-first from `seed` and returns at most `depth` URLs to scrape
//
// Parameters:
//   seed: the starting URL, always element 0 of the result
//   depth: page budget; depth 1 short-circuits to [seed] without fetching
//   rules: Link Filter configuration
//   fetcher: loads each page's outbound links
//
// A failing link fetch never aborts the crawl: that page simply contributes
// no links and the failure is recorded in the report.
pub async fn traverse<F>(seed: &str, depth: usize, rules: &RuleSet, fetcher: &F) -> TraversalReport
where
    F: PageFetcher + ?Sized,
{
    if depth <= 1 {
        return TraversalReport::seed_only(seed);
    }

    let mut frontier: VecDeque<String> = VecDeque::from([seed.to_string()]);
    let mut seen = Seen::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut failures = Vec::new();

    // Size of `seen` at the start of the previous iteration
    let mut prev_len: Option<usize> = None;

    let stop_reason = loop {
        let n = seen.len();
        if frontier.is_empty() {
            break StopReason::FrontierExhausted;
        }
        if n >= depth {
            break StopReason::DepthReached;
        }
        if prev_len == Some(n) {
            break StopReason::Stagnated;
        }
        prev_len = Some(n);

        let Some(url) = next_unvisited(&mut frontier, &visited) else {
            break StopReason::FrontierExhausted;
        };
        visited.insert(url.clone());

        let raw_links = match fetcher.links(&url).await {
            Ok(links) => links,
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch links, skipping page");
                failures.push(FailedPage::new(url.as_str(), &e));
                Vec::new()
            }
        };

        let fresh: Vec<String> = filter_links(raw_links, rules)
            .into_iter()
            .filter(|link| seen.insert(link))
            .collect();

        debug!(url = %url, new_links = fresh.len(), seen = seen.len(), "expanded page");

        if seen.len() >= depth {
            break StopReason::DepthReached;
        }

        frontier.extend(fresh);
    };

    let urls: Vec<String> = std::iter::once(seed.to_string())
        .chain(seen.into_ordered().into_iter().filter(|url| url != seed))
        .take(depth)
        .collect();

    info!(
        seed,
        urls = urls.len(),
        visited = visited.len(),
        failures = failures.len(),
        ?stop_reason,
        "traversal finished"
    );

    TraversalReport {
        urls,
        failures,
        pages_visited: visited.len(),
        stop_reason,
    }
}

// Pops frontier entries until one has not been expanded yet
fn next_unvisited(frontier: &mut VecDeque<String>, visited: &HashSet<String>) -> Option<String> {
    while let Some(url) = frontier.pop_front() {
        if !visited.contains(&url) {
            return Some(url);
        }
    }
    None
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a stagnation guard?
//    - Navigation menus make every page link to the same handful of pages
//    - Without it, a depth larger than the reachable site would keep popping
//      pages that add nothing
//    - The guard is blunt: the first page that adds nothing ends the crawl,
//      even if later frontier entries would have found more
//
// 2. Why is `seen` separate from `visited`?
//    - `seen` is everything discovered (what we will scrape)
//    - `visited` is what we expanded (whose links we fetched)
//    - A page can be seen long before it is visited, or never visited at all
//      when the depth bound is hit first
//
// 3. Why not fetch the frontier in parallel?
//    - Each iteration's decisions depend on the previous iteration's `seen`
//    - Sequential fetching keeps the bookkeeping simple and deterministic
//    - The scrape stage is where the parallelism lives
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;

    fn site_rules() -> RuleSet {
        RuleSet {
            must_start_with: Some("https://x.test/".to_string()),
            ignore_fragments: true,
            ..RuleSet::default()
        }
    }

    fn small_site() -> StubFetcher {
        StubFetcher::new()
            .with_links("https://x.test/a", &["https://x.test/b", "https://x.test/a#frag"])
            .with_links("https://x.test/b", &[])
    }

    #[tokio::test]
    async fn test_small_site_stagnates_before_depth() {
        let fetcher = small_site();
        let report = traverse("https://x.test/a", 5, &site_rules(), &fetcher).await;

        assert_eq!(report.urls[0], "https://x.test/a");
        let mut tail = report.urls[1..].to_vec();
        tail.sort();
        assert_eq!(tail, vec!["https://x.test/b"]);
        assert_eq!(report.stop_reason, StopReason::Stagnated);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_depth_one_returns_seed_without_fetching() {
        let fetcher = small_site();
        let report = traverse("https://x.test/a", 1, &site_rules(), &fetcher).await;

        assert_eq!(report.urls, vec!["https://x.test/a"]);
        assert_eq!(report.stop_reason, StopReason::SeedOnly);
        assert!(fetcher.link_calls().is_empty());
    }

    #[tokio::test]
    async fn test_never_exceeds_depth() {
        let fetcher = StubFetcher::new().with_links(
            "https://x.test/",
            &[
                "https://x.test/1",
                "https://x.test/2",
                "https://x.test/3",
                "https://x.test/4",
                "https://x.test/5",
            ],
        );

        for depth in 2..=7 {
            let report = traverse("https://x.test/", depth, &RuleSet::default(), &fetcher).await;
            assert!(report.urls.len() <= depth, "depth {} gave {:?}", depth, report.urls);
            assert_eq!(report.urls[0], "https://x.test/");
        }
    }

    #[tokio::test]
    async fn test_depth_reached_stops_immediately() {
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/", &["https://x.test/1", "https://x.test/2", "https://x.test/3"]);

        let report = traverse("https://x.test/", 3, &RuleSet::default(), &fetcher).await;

        assert_eq!(report.stop_reason, StopReason::DepthReached);
        assert_eq!(report.urls.len(), 3);
        // Nothing past the seed was expanded
        assert_eq!(fetcher.link_calls(), vec!["https://x.test/"]);
    }

    #[tokio::test]
    async fn test_cyclic_links_terminate() {
        // Every page links to the same two pages
        let both = ["https://x.test/p1", "https://x.test/p2"];
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/", &both)
            .with_links("https://x.test/p1", &both)
            .with_links("https://x.test/p2", &both);

        let report = traverse("https://x.test/", 100, &RuleSet::default(), &fetcher).await;

        assert_eq!(report.urls.len(), 3);
        assert_eq!(report.stop_reason, StopReason::Stagnated);
        assert!(fetcher.link_calls().len() <= 3);
    }

    #[tokio::test]
    async fn test_seed_failure_yields_seed_only() {
        let fetcher = StubFetcher::new();
        let report = traverse("https://x.test/down", 10, &RuleSet::default(), &fetcher).await;

        assert_eq!(report.urls, vec!["https://x.test/down"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, "https://x.test/down");
    }

    #[tokio::test]
    async fn test_failure_mid_crawl_continues() {
        // /b is unreachable but /c still gets expanded
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/", &["https://x.test/b", "https://x.test/c"])
            .with_links("https://x.test/c", &["https://x.test/d"]);

        let report = traverse("https://x.test/", 10, &RuleSet::default(), &fetcher).await;

        // /b added nothing, so the stagnation guard stops before /c
        assert_eq!(report.stop_reason, StopReason::Stagnated);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(fetcher.link_calls(), vec!["https://x.test/", "https://x.test/b"]);
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/", &["https://x.test/b", "https://x.test/c"])
            .with_links("https://x.test/b", &["https://x.test/d"])
            .with_links("https://x.test/c", &["https://x.test/e"])
            .with_links("https://x.test/d", &[])
            .with_links("https://x.test/e", &[]);

        let report = traverse("https://x.test/", 10, &RuleSet::default(), &fetcher).await;

        assert_eq!(
            fetcher.link_calls(),
            vec!["https://x.test/", "https://x.test/b", "https://x.test/c", "https://x.test/d"]
        );
        assert_eq!(report.urls.len(), 5);
    }

    #[tokio::test]
    async fn test_seed_not_duplicated_in_result() {
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/", &["https://x.test/", "https://x.test/b"])
            .with_links("https://x.test/b", &[]);

        let report = traverse("https://x.test/", 10, &RuleSet::default(), &fetcher).await;

        assert_eq!(report.urls, vec!["https://x.test/", "https://x.test/b"]);
    }

    #[tokio::test]
    async fn test_filtered_links_are_not_followed() {
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/a", &["https://elsewhere.test/", "https://x.test/b"])
            .with_links("https://x.test/b", &[]);

        let report = traverse("https://x.test/a", 10, &site_rules(), &fetcher).await;

        assert_eq!(report.urls, vec!["https://x.test/a", "https://x.test/b"]);
        assert!(!fetcher.link_calls().contains(&"https://elsewhere.test/".to_string()));
    }

    #[tokio::test]
    async fn test_frontier_exhausted() {
        // Seed links only to itself: seen grows by one, then only visited
        // entries remain in the frontier
        let fetcher = StubFetcher::new().with_links("https://x.test/", &["https://x.test/"]);

        let report = traverse("https://x.test/", 10, &RuleSet::default(), &fetcher).await;

        assert_eq!(report.urls, vec!["https://x.test/"]);
        assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
        assert_eq!(fetcher.link_calls().len(), 1);
    }
}
