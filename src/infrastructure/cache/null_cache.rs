//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheLookup, CacheResult, LinkCache};
use crate::domain::entities::Link;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every probe is a miss and the existence filter always answers "may exist",
/// so all lookups go straight to the durable store. Used when Redis is
/// unavailable or caching is explicitly disabled.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkCache for NullCache {
    async fn may_exist(&self, _code: &str) -> bool {
        true
    }

    async fn register(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn lookup(&self, _code: &str) -> CacheLookup {
        CacheLookup::Miss
    }

    async fn store(&self, _link: &Link) -> CacheResult<()> {
        Ok(())
    }

    async fn store_negative(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
