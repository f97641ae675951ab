// src/error.rs
// =============================================================================
// Error types shared by the crawl, scrape and pipeline stages.
//
// Two families:
// - FetchError: one URL could not be loaded or evaluated. Always recovered
//   locally (zero links during traversal, omitted text during scraping).
// - HarvestError: the whole request is rejected or aborted.
//
// FetchErrorKind is the serializable summary of a FetchError, used in reports
// and JSON output (a reqwest::Error itself cannot be serialized or cloned).
// =============================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A single page could not be loaded or evaluated
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// Failure reported by a fetcher that is not HTTP-backed
    #[error("{0}")]
    Other(String),
}

/// Coarse category of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    DnsError,
    ConnectError,
    SslError,
    TooManyRedirects,
    HttpStatus,
    InvalidUrl,
    InvalidSelector,
    Error,
}

impl FetchError {
    // reqwest only exposes predicates, so TLS and DNS are sniffed from the message
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Request(e) => {
                let text = e.to_string();
                if e.is_timeout() {
                    FetchErrorKind::Timeout
                } else if e.is_redirect() {
                    FetchErrorKind::TooManyRedirects
                } else if e.is_connect() {
                    if text.contains("dns") {
                        FetchErrorKind::DnsError
                    } else {
                        FetchErrorKind::ConnectError
                    }
                } else if text.contains("certificate") || text.contains("ssl") {
                    FetchErrorKind::SslError
                } else {
                    FetchErrorKind::Error
                }
            }
            FetchError::Status(_) => FetchErrorKind::HttpStatus,
            FetchError::InvalidUrl { .. } => FetchErrorKind::InvalidUrl,
            FetchError::InvalidSelector { .. } => FetchErrorKind::InvalidSelector,
            FetchError::Other(_) => FetchErrorKind::Error,
        }
    }
}

/// A URL that could not be fetched, kept for reports instead of being dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPage {
    pub url: String,
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FailedPage {
    pub fn new(url: impl Into<String>, error: &FetchError) -> Self {
        Self {
            url: url.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// A harvest request was rejected or could not finish
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Cannot exceed depth {max} (requested {requested})")]
    DepthExceeded { requested: usize, max: usize },
    #[error("depth must be greater than zero")]
    InvalidDepth,
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
    #[error("harvest timed out after {0:?}")]
    Timeout(Duration),
}

impl HarvestError {
    /// Stable machine-readable code for API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            HarvestError::DepthExceeded { .. } => "DEPTH_EXCEEDED",
            HarvestError::InvalidDepth => "INVALID_DEPTH",
            HarvestError::InvalidSeed { .. } => "INVALID_SEED",
            HarvestError::Timeout(_) => "TIMEOUT",
        }
    }
}
