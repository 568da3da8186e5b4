//! Redis-backed cache with a bloom (or exact-set) existence filter.

use super::service::{CacheError, CacheLookup, CacheResult, LinkCache};
use crate::domain::entities::Link;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "link:";
const NEGATIVE_SENTINEL: &str = "NULL";

const BLOOM_KEY: &str = "bloom:links";
const BLOOM_CAPACITY: u64 = 1_000_000;
const BLOOM_ERROR_RATE: &str = "0.001";
/// Exact-set fallback when the RedisBloom module is unavailable.
const SET_KEY: &str = "set:links";

/// Redis cache for link lookups with TTL-bounded positive entries, a
/// short-lived negative sentinel, and a never-false-negative existence filter.
///
/// Uses connection pooling via `ConnectionManager`. All operations degrade
/// gracefully: probe errors read as misses, filter errors read as "may exist",
/// and write errors are logged without propagating.
pub struct RedisLinkCache {
    client: ConnectionManager,
    positive_ttl: u64,
    negative_ttl: u64,
    bloom_supported: bool,
}

impl RedisLinkCache {
    /// Connects to Redis, validates the connection with a PING, and probes for
    /// the RedisBloom module. When `BF.RESERVE` is unavailable the existence
    /// filter falls back to an exact Redis SET, which also never reports a
    /// false negative.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        positive_ttl_seconds: u64,
        negative_ttl_seconds: u64,
    ) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut conn = manager.clone();
        conn.ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        let bloom_supported = Self::init_bloom(&mut conn).await;
        if bloom_supported {
            info!("✓ Connected to Redis (bloom filter enabled)");
        } else {
            info!("✓ Connected to Redis (exact-set existence filter)");
        }

        Ok(Self {
            client: manager,
            positive_ttl: positive_ttl_seconds,
            negative_ttl: negative_ttl_seconds,
            bloom_supported,
        })
    }

    /// Reserves the bloom filter if it does not exist yet. Returns whether
    /// the RedisBloom module is usable.
    async fn init_bloom(conn: &mut ConnectionManager) -> bool {
        let exists: i64 = match conn.exists(BLOOM_KEY).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Redis EXISTS failed during bloom init: {}", e);
                return false;
            }
        };
        if exists > 0 {
            return true;
        }

        match redis::cmd("BF.RESERVE")
            .arg(BLOOM_KEY)
            .arg(BLOOM_ERROR_RATE)
            .arg(BLOOM_CAPACITY)
            .query_async::<()>(conn)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                debug!("BF.RESERVE unavailable, using exact set: {}", e);
                false
            }
        }
    }

    fn build_key(&self, code: &str) -> String {
        format!("{}{}", KEY_PREFIX, code)
    }
}

#[async_trait]
impl LinkCache for RedisLinkCache {
    async fn may_exist(&self, code: &str) -> bool {
        let mut conn = self.client.clone();

        let result = if self.bloom_supported {
            redis::cmd("BF.EXISTS")
                .arg(BLOOM_KEY)
                .arg(code)
                .query_async::<i64>(&mut conn)
                .await
        } else {
            conn.sismember::<_, _, i64>(SET_KEY, code).await
        };

        match result {
            Ok(member) => member == 1,
            Err(e) => {
                // Fail open: an unreachable filter must not deny service.
                warn!("Existence filter check failed for {}: {}", code, e);
                true
            }
        }
    }

    async fn register(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        let result = if self.bloom_supported {
            redis::cmd("BF.ADD")
                .arg(BLOOM_KEY)
                .arg(code)
                .query_async::<i64>(&mut conn)
                .await
        } else {
            conn.sadd::<_, _, i64>(SET_KEY, code).await
        };

        result
            .map(|_| ())
            .map_err(|e| CacheError::Operation(format!("filter ADD failed: {}", e)))
    }

    async fn lookup(&self, code: &str) -> CacheLookup {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => {
                if cached == NEGATIVE_SENTINEL {
                    debug!("Cache NEGATIVE HIT: {}", code);
                    return CacheLookup::Negative;
                }
                match serde_json::from_str::<Link>(&cached) {
                    Ok(link) => {
                        debug!("Cache HIT: {}", code);
                        CacheLookup::Hit(link)
                    }
                    Err(e) => {
                        // Corrupt entry; treat as a miss so the store reloads it.
                        warn!("Cache entry for {} failed to decode: {}", code, e);
                        CacheLookup::Miss
                    }
                }
            }
            Ok(None) => {
                debug!("Cache MISS: {}", code);
                CacheLookup::Miss
            }
            Err(e) => {
                warn!("Redis GET error for {}: {}", code, e);
                CacheLookup::Miss
            }
        }
    }

    async fn store(&self, link: &Link) -> CacheResult<()> {
        let key = self.build_key(&link.code);
        let payload = serde_json::to_string(link)
            .map_err(|e| CacheError::Operation(format!("serialize link: {}", e)))?;
        let mut conn = self.client.clone();

        match conn.set_ex::<_, _, ()>(&key, payload, self.positive_ttl).await {
            Ok(()) => {
                debug!("Cache SET: {} (TTL: {}s)", link.code, self.positive_ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", link.code, e);
                Ok(())
            }
        }
    }

    async fn store_negative(&self, code: &str) -> CacheResult<()> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        match conn
            .set_ex::<_, _, ()>(&key, NEGATIVE_SENTINEL, self.negative_ttl)
            .await
        {
            Ok(()) => {
                debug!("Cache SET negative: {} (TTL: {}s)", code, self.negative_ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", code, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        match conn.del::<_, i64>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", code);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", code, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
