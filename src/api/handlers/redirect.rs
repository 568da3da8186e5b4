//! Handlers for short-link resolution and deferred-redirect confirmation.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::entities::{ClickStatus, RedirectMode};
use crate::domain::repositories::ClickEventStore as _;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Interstitial page shown for `click` and `timer` modes.
#[derive(Template)]
#[template(path = "redirect.html")]
struct RedirectPage<'a> {
    code: &'a str,
    target_url: &'a str,
    continue_url: &'a str,
    mode: &'a str,
    timer_seconds: i32,
}

/// Resolves a short code.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// `direct` mode publishes a SUCCESS click event from a detached task and
/// redirects immediately. `click` and `timer` modes mint a click id, embed it
/// in a signed token, publish a PENDING event, and render the interstitial
/// page whose continue link is `/{code}/go/{token}`.
///
/// # Errors
///
/// 404 when the code does not exist, 410 when it is disabled or expired.
pub async fn resolve_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let link = state.links.resolve(&code).await?;

    let ip = client_ip(&headers);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !link.mode.is_deferred() {
        state.publisher.publish_detached(
            link.code.clone(),
            ip,
            user_agent,
            ClickStatus::Success,
            String::new(),
        );

        debug!(code = %link.code, target = %link.url, "redirecting short link");
        return Ok(Redirect::temporary(&link.url).into_response());
    }

    let click_id = Uuid::new_v4().to_string();
    let token = state.tokens.issue(&link.code, &click_id).map_err(|e| {
        error!("failed to issue redirect token: {}", e);
        AppError::internal("Failed to prepare redirect", json!({}))
    })?;

    state.publisher.publish_detached(
        link.code.clone(),
        ip,
        user_agent,
        ClickStatus::Pending,
        click_id,
    );

    let continue_url = format!("/{}/go/{}", link.code, token);
    let page = RedirectPage {
        code: &link.code,
        target_url: &link.url,
        continue_url: &continue_url,
        mode: link.mode.as_str(),
        timer_seconds: effective_timer_seconds(&link.mode, link.timer_seconds),
    };

    let html = page.render().map_err(|e| {
        error!("failed to render redirect page: {}", e);
        AppError::internal("Failed to render page", json!({}))
    })?;

    Ok(Html(html).into_response())
}

/// Confirms a deferred redirect.
///
/// # Endpoint
///
/// `GET /{code}/go/{token}`
///
/// The token alone decides the redirect; the click-event status update runs
/// detached and its failure is logged only. Any token problem is a generic
/// 401 so callers cannot probe for why a token failed.
pub async fn confirm_handler(
    Path((code, token)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let click_id = state
        .tokens
        .validate(&code, &token)
        .map_err(|_| AppError::unauthorized("invalid or expired token"))?;

    let link = state.links.resolve(&code).await?;

    if let Some(click_id) = click_id {
        let clicks = state.clicks.clone();
        tokio::spawn(async move {
            match clicks.mark_status(&click_id, ClickStatus::Success).await {
                Ok(0) => {
                    // Already swept to FAILED or confirmed earlier; the
                    // conditional update leaves terminal rows alone.
                    debug!(click_id = %click_id, "click event already settled");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(click_id = %click_id, "failed to update click event status: {}", e);
                }
            }
        });
    }

    debug!(code = %link.code, target = %link.url, "final redirect");
    Ok(Redirect::temporary(&link.url))
}

fn effective_timer_seconds(mode: &RedirectMode, configured: i32) -> i32 {
    // A timer of zero would render a page that bounces instantly; keep the
    // short grace period the interstitial exists for.
    if *mode == RedirectMode::Timer && configured <= 0 {
        3
    } else {
        configured
    }
}
