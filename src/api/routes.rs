//! API route configuration.

use crate::api::handlers::{
    confirm_handler, create_link_handler, get_link_handler, health_handler, list_links_handler,
    resolve_handler, update_link_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};

/// Management endpoints, nested under `/api`.
///
/// - `POST   /links`         - Create a short link
/// - `GET    /links`         - List links (paginated)
/// - `GET    /links/{code}`  - Fetch one link, including disabled/expired
/// - `PATCH  /links/{code}`  - Partially update a link
pub fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{code}",
            patch(update_link_handler).get(get_link_handler),
        )
}

/// Public resolution endpoints.
///
/// - `GET /{code}`            - Resolve a short code (redirect or interstitial)
/// - `GET /{code}/go/{token}` - Confirm a deferred redirect
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/{code}", get(resolve_handler))
        .route("/{code}/go/{token}", get(confirm_handler))
}

/// Builds the full application router with per-group rate limits.
///
/// The management API gets the stricter limit; resolution traffic gets the
/// public one. `/health` is unthrottled for load balancer probes. The
/// resolution routes are merged last so `/health` and `/api` are matched
/// before the catch-all short-code segment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", management_routes().layer(rate_limit::secure_layer()))
        .merge(public_routes().layer(rate_limit::layer()))
}
