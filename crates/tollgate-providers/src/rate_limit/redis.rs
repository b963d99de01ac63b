//! Redis rate-limit store
//!
//! Each check runs as one Lua script on the server, so "read, compare,
//! conditionally record" cannot interleave with another process doing the
//! same on the same key. When the server refuses scripting (disabled
//! commands, ACLs) the store switches for good to two-step command sequences
//! that may over-admit slightly under races.

use crate::redis_connection::RedisConnection;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tollgate_domain::constants::BURST_KEY_EXPIRY_SLACK_MS;
use tollgate_domain::error::{Error, Result};
use tollgate_domain::ports::{CounterSnapshot, RateLimitStore};
use tollgate_domain::value_objects::StoreDecision;

/// KEYS[1] counter, ARGV[1] limit, ARGV[2] ttl seconds.
/// Returns {admitted, count, retry_after_ms}.
const DAILY_SCRIPT: &str = r"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current >= tonumber(ARGV[1]) then
  local ttl = redis.call('PTTL', KEYS[1])
  if ttl < 0 then ttl = 0 end
  return {0, current, ttl}
end
local value = redis.call('INCR', KEYS[1])
if value == 1 or redis.call('TTL', KEYS[1]) == -1 then
  redis.call('EXPIRE', KEYS[1], ARGV[2])
end
return {1, value, 0}
";

/// KEYS[1] window, ARGV[1] now ms, ARGV[2] window ms, ARGV[3] limit,
/// ARGV[4] member, ARGV[5] expiry slack ms.
/// Returns {admitted, count, retry_after_ms}.
const BURST_SCRIPT: &str = r"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', now - window)
local count = redis.call('ZCARD', KEYS[1])
if count >= tonumber(ARGV[3]) then
  local retry = window
  local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
  if oldest[2] then retry = tonumber(oldest[2]) + window - now end
  if retry < 0 then retry = 0 end
  return {0, count, retry}
end
redis.call('ZADD', KEYS[1], now, ARGV[4])
redis.call('PEXPIRE', KEYS[1], window + tonumber(ARGV[5]))
return {1, count + 1, 0}
";

/// Redis-backed rate-limit store
pub struct RedisRateLimitStore {
    connection: Arc<RedisConnection>,
    daily_script: Script,
    burst_script: Script,
    scripts_available: AtomicBool,
}

impl RedisRateLimitStore {
    /// Create a store; the connection is made on first use
    pub fn new(connection_string: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            connection: Arc::new(RedisConnection::open(connection_string, timeout)?),
            daily_script: Script::new(DAILY_SCRIPT),
            burst_script: Script::new(BURST_SCRIPT),
            scripts_available: AtomicBool::new(true),
        })
    }

    /// Get the Redis server address description
    pub fn server_address(&self) -> &str {
        self.connection.server_address()
    }

    fn disable_scripts(&self, err: &Error) {
        if self.scripts_available.swap(false, Ordering::Relaxed) {
            tracing::warn!(
                server = %self.server_address(),
                error = %err,
                "Redis scripting unavailable; falling back to non-atomic rate-limit checks"
            );
        }
    }

    async fn daily_two_step(
        &self,
        conn: &mut ConnectionManager,
        key: &str,
        limit: u64,
        ttl: Duration,
    ) -> Result<StoreDecision> {
        let count: u64 = self.connection.bounded("INCR", conn.incr(key, 1u64)).await?;
        if count == 1 {
            let _: () = self
                .connection
                .bounded("EXPIRE", conn.expire(key, ttl.as_secs() as i64))
                .await?;
        }

        if count <= limit {
            return Ok(StoreDecision::admitted(count));
        }

        let _: i64 = self.connection.bounded("DECR", conn.decr(key, 1u64)).await?;
        let pttl: i64 = self.connection.bounded("PTTL", conn.pttl(key)).await?;
        Ok(StoreDecision::denied(count - 1, millis(pttl)))
    }

    async fn burst_two_step(
        &self,
        conn: &mut ConnectionManager,
        key: &str,
        limit: u64,
        window_ms: u64,
        now_ms: u64,
    ) -> Result<StoreDecision> {
        let _: () = self
            .connection
            .bounded(
                "ZREMRANGEBYSCORE",
                redis::cmd("ZREMRANGEBYSCORE")
                    .arg(key)
                    .arg("-inf")
                    .arg(now_ms.saturating_sub(window_ms))
                    .query_async(conn),
            )
            .await?;

        let count: u64 = self
            .connection
            .bounded("ZCARD", redis::cmd("ZCARD").arg(key).query_async(conn))
            .await?;

        if count >= limit {
            let oldest: Vec<(String, f64)> = self
                .connection
                .bounded(
                    "ZRANGE",
                    redis::cmd("ZRANGE")
                        .arg(key)
                        .arg(0)
                        .arg(0)
                        .arg("WITHSCORES")
                        .query_async(conn),
                )
                .await?;
            let retry_ms = oldest.first().map_or(window_ms, |(_, score)| {
                (*score as u64 + window_ms).saturating_sub(now_ms)
            });
            return Ok(StoreDecision::denied(count, Duration::from_millis(retry_ms)));
        }

        let _: () = self
            .connection
            .bounded(
                "ZADD",
                redis::cmd("ZADD")
                    .arg(key)
                    .arg(now_ms)
                    .arg(uuid::Uuid::new_v4().to_string())
                    .query_async(conn),
            )
            .await?;
        let _: () = self
            .connection
            .bounded(
                "PEXPIRE",
                redis::cmd("PEXPIRE")
                    .arg(key)
                    .arg(window_ms + BURST_KEY_EXPIRY_SLACK_MS)
                    .query_async(conn),
            )
            .await?;

        Ok(StoreDecision::admitted(count + 1))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn check_daily(&self, key: &str, limit: u64, ttl: Duration) -> Result<StoreDecision> {
        let mut conn = self.connection.get().await?;

        if self.scripts_available.load(Ordering::Relaxed) {
            let mut invocation = self.daily_script.prepare_invoke();
            invocation.key(key).arg(limit).arg(ttl.as_secs());
            match self
                .connection
                .bounded::<Vec<i64>, _>("EVALSHA", invocation.invoke_async(&mut conn))
                .await
            {
                Ok(reply) => return Ok(decision(&reply)),
                Err(e) if scripting_unavailable(&e) => self.disable_scripts(&e),
                Err(e) => return Err(e),
            }
        }

        self.daily_two_step(&mut conn, key, limit, ttl).await
    }

    async fn check_burst(
        &self,
        key: &str,
        limit: u64,
        window: Duration,
        now_ms: u64,
    ) -> Result<StoreDecision> {
        let mut conn = self.connection.get().await?;
        let window_ms = window.as_millis() as u64;

        if self.scripts_available.load(Ordering::Relaxed) {
            let mut invocation = self.burst_script.prepare_invoke();
            invocation
                .key(key)
                .arg(now_ms)
                .arg(window_ms)
                .arg(limit)
                .arg(uuid::Uuid::new_v4().to_string())
                .arg(BURST_KEY_EXPIRY_SLACK_MS);
            match self
                .connection
                .bounded::<Vec<i64>, _>("EVALSHA", invocation.invoke_async(&mut conn))
                .await
            {
                Ok(reply) => return Ok(decision(&reply)),
                Err(e) if scripting_unavailable(&e) => self.disable_scripts(&e),
                Err(e) => return Err(e),
            }
        }

        self.burst_two_step(&mut conn, key, limit, window_ms, now_ms)
            .await
    }

    async fn daily_usage(&self, key: &str) -> Result<CounterSnapshot> {
        let mut conn = self.connection.get().await?;
        let count: Option<u64> = self.connection.bounded("GET", conn.get(key)).await?;
        let Some(count) = count else {
            return Ok(CounterSnapshot::default());
        };
        let pttl: i64 = self.connection.bounded("PTTL", conn.pttl(key)).await?;
        Ok(CounterSnapshot {
            count,
            resets_in: (pttl >= 0).then(|| millis(pttl)),
        })
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection.get().await?;
        self.connection.bounded("DEL", conn.del(keys)).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64> {
        let mut conn = self.connection.get().await?;
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        let mut removed = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .connection
                .bounded(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(100)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = self.connection.bounded("DEL", conn.del(&keys)).await?;
                removed += deleted;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }

    fn supports_atomic_scripts(&self) -> bool {
        self.scripts_available.load(Ordering::Relaxed)
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisRateLimitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimitStore")
            .field("server", &self.server_address())
            .field("atomic_scripts", &self.supports_atomic_scripts())
            .finish()
    }
}

fn decision(reply: &[i64]) -> StoreDecision {
    let field = |i: usize| reply.get(i).copied().unwrap_or(0).max(0) as u64;
    if field(0) == 1 {
        StoreDecision::admitted(field(1))
    } else {
        StoreDecision::denied(field(1), Duration::from_millis(field(2)))
    }
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

/// Whether a failure means the server will never run our scripts
fn scripting_unavailable(err: &Error) -> bool {
    let message = err.to_string().to_ascii_lowercase();
    ["unknown command", "noperm", "scripting is disabled"]
        .iter()
        .any(|marker| message.contains(marker))
}
