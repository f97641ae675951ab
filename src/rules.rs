// src/rules.rs
// =============================================================================
// The Rule Set supplied once per crawl request.
//
// - must_start_with: only links with this exact prefix survive
// - ignore_fragments: strip everything from the first '#'
// - valid_selectors: CSS selectors (usually tag names like "p" or "h2")
//   whose text is harvested during the scrape stage
//
// Every field has a default so a JSON request may omit any of them.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Selector used when a request names none
pub const DEFAULT_SELECTOR: &str = "p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub must_start_with: Option<String>,
    #[serde(default)]
    pub ignore_fragments: bool,
    #[serde(default = "default_selectors")]
    pub valid_selectors: Vec<String>,
}

fn default_selectors() -> Vec<String> {
    vec![DEFAULT_SELECTOR.to_string()]
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            must_start_with: None,
            ignore_fragments: false,
            valid_selectors: default_selectors(),
        }
    }
}

impl RuleSet {
    /// The prefix filter, if one is active
    ///
    /// An empty prefix matches everything, so it counts as unset.
    pub fn prefix(&self) -> Option<&str> {
        self.must_start_with.as_deref().filter(|p| !p.is_empty())
    }

    /// Selectors to apply, falling back to the default when none were given
    pub fn selectors(&self) -> Vec<String> {
        if self.valid_selectors.is_empty() {
            default_selectors()
        } else {
            self.valid_selectors.clone()
        }
    }
}
