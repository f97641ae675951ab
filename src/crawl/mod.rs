// src/crawl/mod.rs
// =============================================================================
// This module handles link discovery.
//
// Features:
// - Breadth-first traversal from a seed URL (queue.rs)
// - Prefix and fragment filtering of discovered links (filter.rs)
// - A page budget ("depth") and a stagnation guard so cyclic sites terminate
// =============================================================================

mod filter;
mod queue;

pub use queue::{traverse, StopReason, TraversalReport};
