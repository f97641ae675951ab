// src/server/mod.rs
// =============================================================================
// The `serve` subcommand: exposes the harvest pipeline over HTTP.
//
// Shared state is read-only (the fetcher and the limits), so each request
// runs its own traversal with its own frontier.
// =============================================================================

mod handlers;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::fetch::PageFetcher;
use crate::pipeline::HarvestOptions;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub options: Arc<HarvestOptions>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/scrape", post(handlers::scrape))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Binds `listen_addr` and serves until Ctrl-C
pub async fn run(listen_addr: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", listen_addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::handlers::ErrorResponse;
    use super::*;
    use crate::config::HarvestConfig;
    use crate::fetch::stub::StubFetcher;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let fetcher = StubFetcher::new()
            .with_links("https://x.test/a", &["https://x.test/b"])
            .with_links("https://x.test/b", &[])
            .with_text("https://x.test/a", "alpha")
            .with_text("https://x.test/b", "beta");

        router(AppState {
            fetcher: Arc::new(fetcher),
            options: Arc::new(HarvestOptions::from(&HarvestConfig::default())),
        })
    }

    fn post_scrape(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_scrape_returns_texts() {
        let body = r#"{"url": "https://x.test/a", "depth": 5, "rules": {"must_start_with": "https://x.test/", "ignore_fragments": true, "valid_selectors": ["p"]}}"#;
        let response = app().oneshot(post_scrape("/scrape", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let texts: Vec<String> = serde_json::from_value(body_json(response).await).unwrap();
        let mut texts = texts;
        texts.sort();
        assert_eq!(texts, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_scrape_detailed_report() {
        let body = r#"{"url": "https://x.test/a", "depth": 1}"#;
        let response = app()
            .oneshot(post_scrape("/scrape?detailed=true", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["outcome"], "collected");
        assert_eq!(json["stop_reason"], "seed_only");
        assert_eq!(json["pages"][0]["url"], "https://x.test/a");
        assert_eq!(json["pages"][0]["text"], "alpha");
        assert_eq!(json["failures"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_scrape_detailed_lists_failures() {
        let body = r#"{"url": "https://x.test/missing", "depth": 1}"#;
        let response = app()
            .oneshot(post_scrape("/scrape?detailed=true", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["pages"], serde_json::json!([]));
        assert_eq!(json["failures"][0]["url"], "https://x.test/missing");
        assert_eq!(json["failures"][0]["kind"], "error");
        assert_eq!(json["failures"][0]["stage"], "scrape");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        for body in [
            r#"{"url": "https://x.test/a", "depth": -1}"#,
            r#"{"url": "https://x.test/a", "depth": 2.5}"#,
            r#"{"url": "https://x.test/a", "depth": 2, "rules": null}"#,
            r#"{"depth": 2}"#,
        ] {
            let response = app().oneshot(post_scrape("/scrape", body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
            assert_eq!(error.error, "INVALID_REQUEST");
            assert!(!error.message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_depth_over_bound_is_bad_request() {
        let body = r#"{"url": "https://x.test/a", "depth": 301}"#;
        let response = app().oneshot(post_scrape("/scrape", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.error, "DEPTH_EXCEEDED");
        assert!(error.message.contains("300"));
    }

    #[tokio::test]
    async fn test_invalid_seed_is_bad_request() {
        let body = r#"{"url": "not a url", "depth": 2}"#;
        let response = app().oneshot(post_scrape("/scrape", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
