//! Durable-store contract for click events.

use crate::domain::entities::{ClickEvent, ClickStatus};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Data access contract for persisted click events.
///
/// Written to by the stream consumer and by status updates; never read on the
/// request-serving path.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickStore`] - PostgreSQL
/// - Test mocks available with `cfg(test)`; in-memory fakes under `tests/`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickEventStore: Send + Sync {
    /// Persists a click event keyed by its id.
    ///
    /// Must be duplicate-tolerant: at-least-once delivery from the stream can
    /// hand the same event to the consumer more than once, and the second
    /// insert must succeed as a no-op.
    async fn insert(&self, event: &ClickEvent) -> Result<(), AppError>;

    /// Transitions a PENDING event to a terminal status.
    ///
    /// The update is conditional on the row still being PENDING, which keeps
    /// the status monotonic when this races with the reconciliation sweep.
    /// Returns the number of rows changed (0 when the event is unknown or
    /// already terminal).
    async fn mark_status(&self, id: &str, status: ClickStatus) -> Result<u64, AppError>;

    /// Bulk-fails all PENDING events older than `cutoff`.
    ///
    /// A single conditional UPDATE: rows already flipped to SUCCESS no longer
    /// match the predicate and are left untouched. Returns the number of rows
    /// transitioned.
    async fn fail_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
