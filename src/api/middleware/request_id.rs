//! Request ID assignment and propagation.
//!
//! Incoming requests keep their `X-Request-ID` header if present; otherwise
//! a fresh UUID is assigned. The ID is echoed back on the response so
//! clients can correlate logs across services.

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Assigns an `X-Request-ID` to requests that arrive without one.
pub fn set_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copies the request's `X-Request-ID` onto the response.
pub fn propagate_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}
