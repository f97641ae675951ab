// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// site-harvester [--config FILE] [-v...] crawl <SEED_URL> [options]
// site-harvester [--config FILE] [-v...] serve [--listen ADDR]
//
// Flags left unset fall back to the config file, then to built-in defaults.
// =============================================================================

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::rules::RuleSet;

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawl a website breadth-first and harvest page text",
    long_about = "site-harvester discovers pages reachable from a seed URL under prefix and \
                  fragment rules, then scrapes the text of selected elements from every page \
                  concurrently. Run it once with `crawl` or expose it over HTTP with `serve`."
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from a seed URL and print the harvested text
    ///
    /// Example: site-harvester crawl https://docs.example.com/ --depth 20 --must-start-with https://docs.example.com/
    Crawl(CrawlArgs),

    /// Serve the harvester over HTTP (POST /scrape)
    Serve {
        /// Address to listen on (overrides listen_addr from the config)
        #[arg(long)]
        listen: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Seed URL to start crawling from
    pub seed_url: String,

    /// Maximum number of pages to harvest, seed included
    ///
    /// Depth 1 = just the seed page
    #[arg(long, default_value_t = 1)]
    pub depth: usize,

    /// Only follow links starting with this prefix
    #[arg(long)]
    pub must_start_with: Option<String>,

    /// Strip '#fragment' suffixes before deduplicating links
    #[arg(long)]
    pub ignore_fragments: bool,

    /// CSS selector whose text is harvested (repeatable, default: p)
    #[arg(long = "selector", short = 's')]
    pub selectors: Vec<String>,

    /// Maximum concurrent page fetches while scraping
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Overall time budget in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output the full report as JSON
    #[arg(long)]
    pub json: bool,

    /// Only discover URLs, do not scrape them
    #[arg(long)]
    pub links_only: bool,
}

impl CrawlArgs {
    pub fn rules(&self) -> RuleSet {
        RuleSet {
            must_start_with: self.must_start_with.clone(),
            ignore_fragments: self.ignore_fragments,
            valid_selectors: self.selectors.clone(),
        }
    }
}
