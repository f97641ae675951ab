// src/server/handlers.rs
// =============================================================================
// Request handlers for the HTTP boundary.
//
// POST /scrape            -> JSON array of page texts
// POST /scrape?detailed=1 -> {outcome, urls, stop_reason, pages, failures}
// GET  /health            -> {"status": "ok"}
//
// Every rejection, including a body that does not deserialize, comes back as
// 400/504 with an {error, message} body.
// =============================================================================

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AppState;
use crate::error::HarvestError;
use crate::pipeline::{harvest, HarvestRequest};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeQuery {
    #[serde(default)]
    pub detailed: bool,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
    payload: Result<Json<HarvestRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "rejected scrape request body");
            let body = ErrorResponse {
                error: "INVALID_REQUEST".to_string(),
                message: rejection.body_text(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    debug!(seed = %request.url, depth = request.depth, detailed = query.detailed, "scrape request");

    match harvest(&request, state.fetcher.as_ref(), &state.options).await {
        Ok(report) if query.detailed => Json(report.detailed()).into_response(),
        Ok(report) => Json(report.texts()).into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &HarvestError) -> Response {
    let status = match error {
        HarvestError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        HarvestError::DepthExceeded { .. }
        | HarvestError::InvalidDepth
        | HarvestError::InvalidSeed { .. } => StatusCode::BAD_REQUEST,
    };

    let body = ErrorResponse {
        error: error.code().to_string(),
        message: error.to_string(),
    };

    (status, Json(body)).into_response()
}
