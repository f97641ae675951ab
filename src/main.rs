// src/main.rs
// =============================================================================
// Entry point of the site-harvester binary.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load configuration and set up logging
// 3. Dispatch to `crawl` (one harvest, printed) or `serve` (HTTP boundary)
// 4. Exit with a code: 0 = text harvested, 1 = nothing harvested, 2 = error
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod logging;
mod pipeline;
mod rules;
mod scrape;
mod server;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use cli::{Cli, Commands, CrawlArgs};
use config::HarvestConfig;
use fetch::HttpPageFetcher;
use pipeline::{HarvestOptions, HarvestOutcome, HarvestReport, HarvestRequest};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = HarvestConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args, config).await,
        Commands::Serve { listen } => handle_serve(listen, config).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: CrawlArgs, mut config: HarvestConfig) -> Result<i32> {
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.pipeline_timeout_secs = timeout;
    }

    let fetcher = HttpPageFetcher::new(&config)?;
    let options = HarvestOptions::from(&config);
    let request = HarvestRequest {
        url: args.seed_url.clone(),
        depth: args.depth,
        rules: args.rules(),
    };

    // Progress goes to stderr so --json output stays parseable
    eprintln!("🔍 Harvesting: {}", request.url);
    eprintln!("📊 Page budget: {}", request.depth);

    if args.links_only {
        let traversal = pipeline::discover(&request, &fetcher, &options).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&traversal)?);
        } else {
            for url in &traversal.urls {
                println!("{}", url);
            }
        }
        return Ok(0);
    }

    let report = pipeline::harvest(&request, &fetcher, &options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.detailed())?);
    } else {
        print_table(&report);
    }

    match report.outcome {
        HarvestOutcome::Collected => Ok(0),
        HarvestOutcome::Empty | HarvestOutcome::Failed => Ok(1),
    }
}

// Handles the 'serve' subcommand
async fn handle_serve(listen: Option<String>, config: HarvestConfig) -> Result<i32> {
    let listen_addr = listen.unwrap_or_else(|| config.listen_addr.clone());

    let state = server::AppState {
        fetcher: Arc::new(HttpPageFetcher::new(&config)?),
        options: Arc::new(HarvestOptions::from(&config)),
    };

    server::run(&listen_addr, state).await?;
    Ok(0)
}

// Prints one row per harvested page plus a summary
fn print_table(report: &HarvestReport) {
    println!("{:<60} {:<8} {:<40}", "URL", "CHARS", "PREVIEW");
    println!("{}", "=".repeat(110));

    for page in report.pages() {
        let preview: String = page.text.lines().next().unwrap_or("").chars().take(37).collect();
        println!(
            "{:<60} {:<8} {:<40}",
            truncate(&page.url, 57),
            page.text.chars().count(),
            preview
        );
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("{:<60} {:<10} {:<20} {:<30}", "FAILED URL", "STAGE", "KIND", "MESSAGE");
        println!("{}", "=".repeat(120));
        for (stage, failure) in &failures {
            println!(
                "{:<60} {:<10} {:<20} {:<30}",
                truncate(&failure.url, 57),
                format!("{:?}", stage),
                format!("{:?}", failure.kind),
                failure.message
            );
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   🔗 Discovered: {}", report.traversal.urls.len());
    println!("   ✅ Harvested: {}", report.scrape.succeeded.len());
    // A URL that failed in both stages counts once
    println!("   ❌ Failed: {}", report.failed_urls());
    println!("   🛑 Stopped: {:?}", report.traversal.stop_reason);
}

fn truncate(url: &str, max: usize) -> String {
    if url.chars().count() > max {
        let head: String = url.chars().take(max).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}
