// src/scrape/mod.rs
// =============================================================================
// This module turns a list of URLs into a text corpus.
//
// Submodules:
// - gather: the bounded scatter-gather stage and its report types
// =============================================================================

mod gather;

pub use gather::{scrape, ScrapeReport, ScrapedPage};
