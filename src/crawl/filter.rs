// src/crawl/filter.rs
// =============================================================================
// The Link Filter: raw links in, filtered links out.
//
// Order of application:
// 1. Prefix filter (plain string prefix, no URL normalisation)
// 2. Fragment stripping (truncate at the first '#')
//
// Input order is preserved and duplicates are kept. Deduplication is the
// traversal's job, not ours.
// =============================================================================

use crate::rules::RuleSet;

// Applies the rule set to a list of raw links
//
// Applying the filter twice gives the same result as applying it once, as
// long as the prefix itself contains no '#'.
pub fn filter_links<I, S>(raw_links: I, rules: &RuleSet) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let prefix = rules.prefix();

    raw_links
        .into_iter()
        .map(Into::into)
        .filter(|link| prefix.map_or(true, |p| link.starts_with(p)))
        .map(|link| {
            if rules.ignore_fragments {
                strip_fragment(link)
            } else {
                link
            }
        })
        .collect()
}

fn strip_fragment(mut link: String) -> String {
    if let Some(pos) = link.find('#') {
        link.truncate(pos);
    }
    link
}
