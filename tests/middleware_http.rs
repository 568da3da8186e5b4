mod common;

use axum::http::{Method, StatusCode};
use axum::{Router, routing::get};
use axum_test::TestServer;
use linkrelay::api::handlers::health_handler;
use linkrelay::api::middleware::{cors, rate_limit, request_id};
use linkrelay::api::routes;

/// Management routes wrapped in the stricter per-IP limiter, as the
/// production router assembles them.
fn throttled_server() -> TestServer {
    let (state, _backend) = common::create_test_state();
    let app = Router::new()
        .nest(
            "/api",
            routes::management_routes().layer(rate_limit::secure_layer()),
        )
        .with_state(state);
    TestServer::new(app).unwrap()
}

// ─── RATE LIMITING ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_management_requests_throttle_after_burst() {
    let server = throttled_server();

    // The burst allowance admits 10 requests from one client.
    for _ in 0..10 {
        let response = server
            .get("/api/links")
            .add_header("x-forwarded-for", "203.0.113.7")
            .await;
        response.assert_status(StatusCode::OK);
    }

    let response = server
        .get("/api/links")
        .add_header("x-forwarded-for", "203.0.113.7")
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_throttling_keys_on_client_ip() {
    let server = throttled_server();

    for _ in 0..=10 {
        server
            .get("/api/links")
            .add_header("x-forwarded-for", "203.0.113.8")
            .await;
    }

    // A different client keeps its own budget.
    let response = server
        .get("/api/links")
        .add_header("x-forwarded-for", "203.0.113.9")
        .await;
    response.assert_status(StatusCode::OK);
}

// ─── CORS ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_preflight_is_answered_for_management_api() {
    let (state, _backend) = common::create_test_state();
    let app = Router::new()
        .nest("/api", routes::management_routes())
        .layer(cors::layer())
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server
        .method(Method::OPTIONS, "/api/links")
        .add_header("origin", "https://dashboard.example.com")
        .add_header("access-control-request-method", "POST")
        .await;

    assert_eq!(response.header("access-control-allow-origin"), "*");
    let methods = response.header("access-control-allow-methods");
    assert!(methods.to_str().unwrap().contains("POST"));
}

// ─── REQUEST ID ──────────────────────────────────────────────────────────────

fn request_id_server() -> TestServer {
    let (state, _backend) = common::create_test_state();
    let app = Router::new()
        .route("/health", get(health_handler))
        .layer(request_id::propagate_layer())
        .layer(request_id::set_layer())
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_request_id_assigned_when_missing() {
    let server = request_id_server();

    let response = server.get("/health").await;

    let id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_request_id_echoed_when_provided() {
    let server = request_id_server();

    let response = server
        .get("/health")
        .add_header("x-request-id", "trace-me-7f3a")
        .await;

    assert_eq!(response.header("x-request-id"), "trace-me-7f3a");
}
