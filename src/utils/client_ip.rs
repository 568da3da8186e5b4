//! Client IP extraction from reverse-proxy headers.

use axum::http::HeaderMap;

/// Fallback when no proxy header carries an address.
const UNKNOWN_IP: &str = "unknown";

/// Extracts the client address from `X-Forwarded-For` (first hop) or
/// `X-Real-IP`.
///
/// The service is deployed behind a trusted reverse proxy, so these headers
/// are the source of truth for the click-event `ip` field.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}
