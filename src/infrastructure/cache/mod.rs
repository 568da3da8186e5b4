//! Caching layer for fast redirect lookups.
//!
//! Provides a [`LinkCache`] trait with two implementations:
//! - [`RedisLinkCache`] - Production Redis-backed cache with existence filter
//! - [`NullCache`] - No-op implementation for testing/disabled caching

mod null_cache;
mod redis_cache;
mod service;

pub use null_cache::NullCache;
pub use redis_cache::RedisLinkCache;
pub use service::{CacheError, CacheLookup, CacheResult, LinkCache};

#[cfg(test)]
pub use service::MockLinkCache;
