//! HTTP route table.
//!
//! Wires the handlers into a versioned axum router and stacks the shared
//! middleware on top.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        // On-demand computation
        .route("/issues/{issue_key}/cycle-time", get(handlers::get_cycle_time))
        // Report jobs
        .route("/reports", post(handlers::create_report))
        .route("/jobs/{job_id}", get(handlers::get_job_status))
        .route("/jobs/{job_id}/logs", get(handlers::stream_job_logs));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Key lists stay small; 2 MiB leaves plenty of headroom.
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Dashboards call this API cross-origin; tighten before exposing
        // the server beyond a trusted network.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
