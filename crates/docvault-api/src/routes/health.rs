//! Probes and the Prometheus scrape endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use docvault_core::BackendHealth;
use docvault_custody::CustodyHealth;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ReadinessReport {
    #[serde(flatten)]
    custody: CustodyHealth,
    directory: BackendHealth,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(metrics))
}

/// Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// 200 "ready" when every backend answers, otherwise 503 with the report.
async fn readiness(State(state): State<AppState>) -> Response {
    let (custody, directory) = tokio::join!(state.custody.health(), state.identity.health());
    if custody.is_ready() && directory.is_healthy() {
        return "ready".into_response();
    }
    let report = ReadinessReport { custody, directory };
    tracing::warn!(?report, "readiness probe failed");
    (StatusCode::SERVICE_UNAVAILABLE, Json(report)).into_response()
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
