//! PostgreSQL implementation of the click event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ClickEvent, ClickStatus};
use crate::domain::repositories::ClickEventStore;
use crate::error::AppError;

/// PostgreSQL store for click events.
///
/// Inserts are idempotent on `id` and status transitions are guarded by a
/// `status = 'PENDING'` predicate, so at-least-once delivery and the
/// sweeper/confirmation race both resolve without locking.
pub struct PgClickStore {
    pool: Arc<PgPool>,
}

impl PgClickStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickEventStore for PgClickStore {
    async fn insert(&self, event: &ClickEvent) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO click_events (id, link_code, ip, user_agent, status, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&event.id)
        .bind(&event.link_code)
        .bind(&event.ip)
        .bind(&event.user_agent)
        .bind(event.status.as_str())
        .bind(event.timestamp)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn mark_status(&self, id: &str, status: ClickStatus) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE click_events SET status = $2 \
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn fail_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE click_events SET status = 'FAILED' \
             WHERE status = 'PENDING' AND timestamp < $1",
        )
        .bind(cutoff)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}
