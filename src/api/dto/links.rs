//! DTOs for the link management endpoints.

use crate::domain::entities::{Link, RedirectMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use validator::Validate;

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Optional custom short code; one is generated when absent.
    pub code: Option<String>,

    /// Destination URL (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Resolution policy; defaults to `direct`.
    #[serde(default)]
    pub mode: Option<RedirectMode>,

    /// Countdown length for `timer` mode.
    #[validate(range(min = 0, max = 300))]
    #[serde(default)]
    pub timer_seconds: Option<i32>,

    #[serde(default)]
    pub disabled: Option<bool>,

    /// Optional expiry timestamp. After this time, the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PATCH /api/links/{code}`.
///
/// All fields are optional — only provided fields are changed.
///
/// # `expires_at` semantics
///
/// - **Absent** (`expires_at` not in JSON) → leave existing value unchanged
/// - **`null`** → clear expiry (link never expires)
/// - **Timestamp** → set new expiry
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    pub mode: Option<RedirectMode>,

    #[validate(range(min = 0, max = 300))]
    pub timer_seconds: Option<i32>,

    pub disabled: Option<bool>,

    /// Expiry timestamp. Absent = no change, null = clear, value = set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Pagination query for `GET /api/links`.
#[derive(Debug, Default, Deserialize)]
pub struct ListLinksQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One link as returned by the management API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub url: String,
    pub mode: RedirectMode,
    pub timer_seconds: i32,
    pub disabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            url: link.url,
            mode: link.mode,
            timer_seconds: link.timer_seconds,
            disabled: link.disabled,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Response for `GET /api/links`.
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub links: Vec<LinkResponse>,
    pub limit: i64,
    pub offset: i64,
    pub count: usize,
}
