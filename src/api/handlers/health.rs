//! Handler for health check endpoint.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::api::dto::HealthResponse;
use crate::infrastructure::cache::LinkCache as _;
use crate::state::AppState;

/// Returns service status and cache reachability.
///
/// # Endpoint
///
/// `GET /health`
///
/// Always responds 200; a cold cache degrades latency but the service still
/// resolves links from the store, so cache state is reported rather than
/// turned into a failure code.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_healthy = state.cache.health_check().await;

    Json(HealthResponse {
        status: "ok",
        cache_healthy,
        time: Utc::now().to_rfc3339(),
    })
}
