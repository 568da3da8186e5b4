//! Cache service trait and error types.

use crate::domain::entities::Link;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Outcome of a cache probe for a link.
///
/// A `Negative` hit is a cached "confirmed absent" marker and is distinct
/// from a `Miss`: the former short-circuits to NotFound, the latter falls
/// through to the durable store.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Link),
    Negative,
    Miss,
}

/// Trait for the link lookup cache plus its existence pre-filter.
///
/// Implementations must fail open: a backend outage degrades a probe to
/// `Miss` and the filter to "may exist", so lookups fall back to the durable
/// store instead of denying service.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisLinkCache`] - Redis with a bloom or
///   exact-set existence filter
/// - [`crate::infrastructure::cache::NullCache`] - no-op for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkCache: Send + Sync {
    /// Existence pre-filter check.
    ///
    /// `false` is authoritative ("this code was never created"); `true` is
    /// only a hint. Backend errors must return `true`.
    async fn may_exist(&self, code: &str) -> bool;

    /// Registers a code in the existence filter. Called once at creation;
    /// codes are never removed.
    async fn register(&self, code: &str) -> CacheResult<()>;

    /// Probes the cache for a positive entry or a negative sentinel.
    async fn lookup(&self, code: &str) -> CacheLookup;

    /// Caches a link snapshot with the long (positive) TTL.
    async fn store(&self, link: &Link) -> CacheResult<()>;

    /// Caches a "confirmed absent" sentinel with the short (negative) TTL.
    async fn store_negative(&self, code: &str) -> CacheResult<()>;

    /// Removes a cached entry so the next lookup reloads fresh state.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
