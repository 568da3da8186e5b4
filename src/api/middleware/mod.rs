//! HTTP middleware for request processing and observability.

pub mod cors;
pub mod rate_limit;
pub mod request_id;
pub mod tracing;
