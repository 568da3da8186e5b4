//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink, RedirectMode};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;

const SELECT_COLUMNS: &str =
    "code, url, mode, timer_seconds, disabled, expires_at, created_at, updated_at";

/// PostgreSQL store for link rows.
///
/// `mode` is persisted as lowercase text and converted at the boundary.
pub struct PgLinkStore {
    pool: Arc<PgPool>,
}

impl PgLinkStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    code: String,
    url: String,
    mode: String,
    timer_seconds: i32,
    disabled: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let mode: RedirectMode = row.mode.parse().map_err(|e: String| {
            AppError::internal("Corrupt link row", json!({ "reason": e, "code": row.code }))
        })?;

        Ok(Link {
            code: row.code,
            url: row.url,
            mode,
            timer_seconds: row.timer_seconds,
            disabled: row.disabled,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            "INSERT INTO links (code, url, mode, timer_seconds, disabled, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {SELECT_COLUMNS}"
        );

        let row: LinkRow = sqlx::query_as(&sql)
            .bind(&new_link.code)
            .bind(&new_link.url)
            .bind(new_link.mode.as_str())
            .bind(new_link.timer_seconds)
            .bind(new_link.disabled)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM links WHERE code = $1");

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::try_from).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM links \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(Link::try_from).collect()
    }

    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Option<Link>, AppError> {
        // Single conditional statement: COALESCE keeps unset fields, the
        // $6/$7 pair carries the double-option expiry (set / clear / keep).
        let sql = format!(
            "UPDATE links SET \
                url = COALESCE($2, url), \
                mode = COALESCE($3, mode), \
                timer_seconds = COALESCE($4, timer_seconds), \
                disabled = COALESCE($5, disabled), \
                expires_at = CASE WHEN $6 THEN $7 ELSE expires_at END, \
                updated_at = NOW() \
             WHERE code = $1 \
             RETURNING {SELECT_COLUMNS}"
        );

        let set_expiry = patch.expires_at.is_some();
        let expires_at = patch.expires_at.flatten();

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(code)
            .bind(patch.url)
            .bind(patch.mode.map(|m| m.as_str()))
            .bind(patch.timer_seconds)
            .bind(patch.disabled)
            .bind(set_expiry)
            .bind(expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let row = LinkRow {
            code: "abc".to_string(),
            url: "https://example.com".to_string(),
            mode: "timer".to_string(),
            timer_seconds: 5,
            disabled: false,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let link: Link = row.try_into().unwrap();
        assert_eq!(link.mode, RedirectMode::Timer);
        assert_eq!(link.timer_seconds, 5);
    }

    #[test]
    fn test_row_conversion_rejects_unknown_mode() {
        let row = LinkRow {
            code: "abc".to_string(),
            url: "https://example.com".to_string(),
            mode: "bounce".to_string(),
            timer_seconds: 0,
            disabled: false,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(Link::try_from(row).is_err());
    }
}
