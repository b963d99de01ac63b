//! Redis distributed cache provider
//!
//! Shares cached responses across every process pointed at the same Redis.
//! Entries are plain `SET .. EX` strings. A per-namespace sorted set indexes
//! the keys, scored by expiry time, so one provider's entries can be cleared
//! without touching others. Every write trims members that have already
//! expired, which keeps the index bounded by the live entries.
//!
//! ## Example
//!
//! ```ignore
//! use tollgate_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379", Duration::from_millis(500))?;
//! ```

use crate::redis_connection::RedisConnection;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tollgate_domain::error::Result;
use tollgate_domain::ports::CacheProvider;
use tollgate_domain::value_objects::{CacheEntryConfig, CacheStats, cache_index_key};

/// Redis cache provider
#[derive(Clone)]
pub struct RedisCacheProvider {
    connection: Arc<RedisConnection>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider with connection string
    ///
    /// # Arguments
    ///
    /// * `connection_string` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `timeout` - Upper bound for connecting and for each command
    pub fn new(connection_string: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            connection: Arc::new(RedisConnection::open(connection_string, timeout)?),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Get the Redis server address description
    pub fn server_address(&self) -> &str {
        self.connection.server_address()
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.get().await?;
        let value: Option<String> = self.connection.bounded("GET", conn.get(key)).await?;

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(value)
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.connection.get().await?;
        let ttl_seconds = config.effective_ttl().as_secs().max(1);

        let mut pipe = redis::pipe();
        pipe.atomic().set_ex(key, value, ttl_seconds).ignore();
        if let Some(namespace) = &config.namespace {
            let index = cache_index_key(namespace);
            let now = unix_now();
            pipe.zrembyscore(&index, "-inf", now)
                .ignore()
                .zadd(&index, key, now + ttl_seconds)
                .ignore()
                .expire(&index, i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
                .ignore();
        }

        let _: () = self
            .connection
            .bounded("SET", pipe.query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.get().await?;
        let deleted: i64 = self.connection.bounded("DEL", conn.del(key)).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.get().await?;
        self.connection.bounded("EXISTS", conn.exists(key)).await
    }

    async fn clear_namespace(&self, namespace: &str) -> Result<u64> {
        let mut conn = self.connection.get().await?;
        let index = cache_index_key(namespace);

        let keys: Vec<String> = self
            .connection
            .bounded("ZRANGE", conn.zrange(&index, 0, -1))
            .await?;

        let mut removed = 0;
        if !keys.is_empty() {
            removed = self.connection.bounded("DEL", conn.del(&keys)).await?;
        }
        let _: i64 = self.connection.bounded("DEL", conn.del(&index)).await?;
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ..CacheStats::default()
        };
        stats.hit_rate = stats.calculate_hit_rate();
        Ok(stats)
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("server", &self.server_address())
            .finish()
    }
}
