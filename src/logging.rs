// src/logging.rs
// =============================================================================
// Sets up tracing output.
//
// RUST_LOG wins when it is set. Otherwise the number of -v flags picks the
// level: none = warn, -v = info, -vv = debug, -vvv = trace.
//
// Logs go to stderr so `crawl --json` can be piped straight into jq.
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("site_harvester={},tower_http={}", level, level)
}
