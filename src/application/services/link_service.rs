//! Cache-aside link resolution over the durable store.

use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheLookup, LinkCache};
use serde_json::json;
use tracing::warn;

/// Default page size for listing when the caller passes `limit <= 0`.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Link resolution layer composing the existence filter, the lookup cache,
/// and the durable store.
///
/// Lookup order for [`Self::get_by_code`]:
///
/// 1. Existence filter — definite absence short-circuits to NotFound without
///    touching cache or store (the defense against scraping of codes that
///    were never created).
/// 2. Cache probe — a positive entry or a negative sentinel answers directly.
/// 3. Store read — the result is written back as a positive entry or a
///    short-lived negative sentinel.
///
/// Concurrent misses for the same code may race through step 3 independently;
/// the overwrites are idempotent so this costs only duplicate reads.
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn LinkCache>,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, cache: Arc<dyn LinkCache>) -> Self {
        Self { store, cache }
    }

    /// Creates a link in the durable store and registers its code in the
    /// existence filter.
    ///
    /// Filter registration happens after the store write and is fail-open: a
    /// failure is logged and the create still succeeds. Until the filter is
    /// repaired out of band, such a code reads as non-existent on the lookup
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the code already exists.
    pub async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let link = self.store.insert(new_link).await?;

        if let Err(e) = self.cache.register(&link.code).await {
            warn!(code = %link.code, "failed to register code in existence filter: {}", e);
        }

        Ok(link)
    }

    /// Resolves a code to its link, NotFound when it does not exist.
    pub async fn get_by_code(&self, code: &str) -> Result<Link, AppError> {
        if !self.cache.may_exist(code).await {
            return Err(not_found(code));
        }

        match self.cache.lookup(code).await {
            CacheLookup::Hit(link) => return Ok(link),
            CacheLookup::Negative => return Err(not_found(code)),
            CacheLookup::Miss => {}
        }

        match self.store.fetch_by_code(code).await? {
            Some(link) => {
                if let Err(e) = self.cache.store(&link).await {
                    warn!(code = %code, "failed to cache link: {}", e);
                }
                Ok(link)
            }
            None => {
                if let Err(e) = self.cache.store_negative(code).await {
                    warn!(code = %code, "failed to cache negative sentinel: {}", e);
                }
                Err(not_found(code))
            }
        }
    }

    /// Resolves a code for the redirect path, distinguishing Gone from
    /// NotFound: a disabled or expired link exists but no longer serves.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        let link = self.get_by_code(code).await?;

        if link.disabled {
            return Err(AppError::gone(
                "Link is disabled",
                json!({ "code": code }),
            ));
        }
        if link.is_expired() {
            return Err(AppError::gone("Link expired", json!({ "code": code })));
        }

        Ok(link)
    }

    /// Lists links newest-first, straight from the durable store.
    ///
    /// Not a hot path, so the cache is bypassed. `limit <= 0` falls back to
    /// the default page size; negative offsets clamp to zero.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let limit = if limit <= 0 { DEFAULT_LIST_LIMIT } else { limit };
        let offset = offset.max(0);

        self.store.list(limit, offset).await
    }

    /// Applies a partial update and invalidates the cache entry so the next
    /// lookup reloads fresh state. The existence filter is untouched (code
    /// membership does not change on update).
    pub async fn update(&self, code: &str, patch: LinkPatch) -> Result<Link, AppError> {
        let link = self
            .store
            .update(code, patch)
            .await?
            .ok_or_else(|| not_found(code))?;

        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code = %code, "failed to invalidate cache entry: {}", e);
        }

        Ok(link)
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}
