//! Durable-store contract for short links.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Data access contract for the durable link store.
///
/// This is the store-of-record seam: the caching resolution layer
/// ([`crate::application::services::LinkService`]) composes an implementation
/// of this trait with a [`crate::infrastructure::cache::LinkCache`]. Cache and
/// filter concerns never leak into implementations of this trait.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL
/// - Test mocks available with `cfg(test)`; in-memory fakes under `tests/`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Inserts a new link. Code uniqueness is enforced by the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the code already exists and
    /// [`AppError::Internal`] on other database errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Fetches a link by code. `Ok(None)` when no row matches.
    async fn fetch_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists links ordered by creation time descending.
    ///
    /// Callers are expected to pass sanitized `limit`/`offset`.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError>;

    /// Applies a partial update to the row matching `code`.
    ///
    /// Only fields present in the patch change. Returns the updated link, or
    /// `Ok(None)` when no row matched.
    async fn update(&self, code: &str, patch: LinkPatch) -> Result<Option<Link>, AppError>;
}
