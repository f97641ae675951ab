// src/fetch/html.rs
// =============================================================================
// Pure HTML helpers used by HttpPageFetcher.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (html5ever underneath)
// - Supports CSS selectors for finding elements
//
// Links are resolved against the page URL the way a browser reports
// `element.href`, so the Link Filter sees absolute URLs.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::FetchError;

// Extracts every link from an HTML page
//
// Parameters:
//   html: the page source
//   page_url: the URL the page was served from (after redirects)
//
// Returns: absolute URLs in document order, duplicates kept
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   page_url = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    // "a[href]" is a constant and always parses
    let selector = Selector::parse("a[href]").unwrap();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(page_url, href))
        .collect()
}

// Resolves a possibly-relative href to an absolute URL
//
// Url::join handles both cases: an absolute href replaces the base, a
// relative one is resolved against it. Unparseable hrefs yield None.
fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|url| url.to_string())
}

// Extracts the text of every element matching any of `selectors`
//
// All selectors are compiled into one selector list, so matches come back in
// document order no matter which selector they matched. Each element's text
// nodes are concatenated and whitespace runs collapse to a single space, so
// inline markup keeps the spaces between words. Elements are joined with '\n'.
// Nested matches (a <p> inside a matched <li>) each produce their own line.
pub fn extract_text(html: &str, selectors: &[String]) -> Result<String, FetchError> {
    let selector = compile_selectors(selectors)?;
    let Some(selector) = selector else {
        return Ok(String::new());
    };

    let document = Html::parse_document(html);
    let lines: Vec<String> = document.select(&selector).map(element_text).collect();

    Ok(lines.join("\n"))
}

fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compile_selectors(selectors: &[String]) -> Result<Option<Selector>, FetchError> {
    let names: Vec<&str> = selectors
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if names.is_empty() {
        return Ok(None);
    }

    // Validate one at a time so the error names the offending selector
    for name in &names {
        Selector::parse(name).map_err(|e| FetchError::InvalidSelector {
            selector: name.to_string(),
            reason: e.to_string(),
        })?;
    }

    let list = names.join(", ");
    Selector::parse(&list)
        .map(Some)
        .map_err(|e| FetchError::InvalidSelector {
            selector: list.clone(),
            reason: e.to_string(),
        })
}
