//! DTO for the health endpoint.

use serde::Serialize;

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache_healthy: bool,
    pub time: String,
}
