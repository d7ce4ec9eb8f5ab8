//! # docvault-api: HTTP Surface for Document Custody
//!
//! ## API Surface
//!
//! | Route                                         | Auth   | Module                 |
//! |-----------------------------------------------|--------|------------------------|
//! | `POST /api/createUser`, `POST /api/login`     | none   | [`routes::users`]      |
//! | `POST /api/createdoc`                         | bearer | [`routes::documents`]  |
//! | `GET /api/querydocbyuserid/{user_id}[/download]` | bearer | [`routes::documents`] |
//! | `GET /api/querydocbydocid/{user_id}/{doc_id}` | bearer | [`routes::documents`]  |
//! | `GET /api/querydocbyname/{doc_name}`          | bearer | [`routes::documents`]  |
//! | `GET /api/download/{content_address}`         | bearer | [`routes::documents`]  |
//! | `GET /openapi.json`                           | bearer | [`openapi`]            |
//! | `/health/*`, `/metrics`                       | none   | [`routes::health`]     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → BodyLimit → AuthMiddleware (document routes) → Handler
//! ```

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
///
/// Health probes and the metrics scrape are mounted outside auth and
/// outside request metrics.
pub fn app(state: AppState) -> Router {
    // Multipart framing needs headroom over the file itself.
    let body_limit = state.config.max_upload_bytes.saturating_add(64 * 1024);

    let documents = Router::new()
        .merge(routes::documents::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware));

    let api = Router::new()
        .merge(routes::users::router())
        .merge(documents)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(state.identity.clone()))
        .with_state(state.clone());

    let health = routes::health::router().with_state(state);

    Router::new().merge(health).merge(api)
}
