//! Handlers for link management endpoints (create, list, fetch, update).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::application::services::DEFAULT_LIST_LIMIT;

use crate::api::dto::{
    CreateLinkRequest, LinkResponse, ListLinksQuery, ListLinksResponse, UpdateLinkRequest,
};
use crate::domain::entities::{LinkPatch, NewLink};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::{generate_code, validate_custom_code};

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "code": "my-link",        // optional, generated when absent
///   "mode": "timer",          // optional: direct | click | timer
///   "timer_seconds": 5,       // optional
///   "expires_at": "2026-12-31T23:59:59Z"  // optional
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails, 409 Conflict when the
/// requested custom code is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let custom = payload.code.is_some();
    let code = match payload.code {
        Some(code) => {
            validate_custom_code(&code)?;
            code
        }
        None => generate_code(),
    };

    let make_link = |code: String| NewLink {
        code,
        url: payload.url.clone(),
        mode: payload.mode.unwrap_or_default(),
        timer_seconds: payload.timer_seconds.unwrap_or(0),
        disabled: payload.disabled.unwrap_or(false),
        expires_at: payload.expires_at,
    };

    let mut result = state.links.create(make_link(code)).await;

    // Generated codes retry on collision; custom codes surface the 409.
    if !custom {
        let mut attempts = 0;
        while attempts < GENERATED_CODE_RETRIES
            && matches!(result, Err(AppError::Conflict { .. }))
        {
            result = state.links.create(make_link(generate_code())).await;
            attempts += 1;
        }
    }

    let link = result?;
    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Retries after a generated short code collides with an existing one.
const GENERATED_CODE_RETRIES: usize = 3;

/// Lists links with pagination.
///
/// # Endpoint
///
/// `GET /api/links?limit=20&offset=0`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(query): Query<ListLinksQuery>,
) -> Result<Json<ListLinksResponse>, AppError> {
    let limit = query.limit.unwrap_or(0);
    let offset = query.offset.unwrap_or(0).max(0);

    let links = state.links.list(limit, offset).await?;
    let links: Vec<LinkResponse> = links.into_iter().map(Into::into).collect();

    Ok(Json(ListLinksResponse {
        limit: if limit <= 0 { DEFAULT_LIST_LIMIT } else { limit },
        offset,
        count: links.len(),
        links,
    }))
}

/// Fetches a single link by code, including disabled and expired ones.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.links.get_by_code(&code).await?;
    Ok(Json(link.into()))
}

/// Partially updates a short link.
///
/// # Endpoint
///
/// `PATCH /api/links/{code}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed; `expires_at`
/// accepts `null` to clear the expiry.
///
/// # Cache
///
/// The cache entry for this link is invalidated so the next resolution reads
/// the updated row from the store.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
/// Returns 400 Bad Request if validation fails.
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let patch = LinkPatch {
        url: payload.url,
        mode: payload.mode,
        timer_seconds: payload.timer_seconds,
        disabled: payload.disabled,
        expires_at: payload.expires_at,
    };

    let link = state.links.update(&code, patch).await?;

    Ok(Json(link.into()))
}
