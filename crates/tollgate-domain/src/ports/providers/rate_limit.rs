//! Rate Limit Store Port
//!
//! The shared counter store behind the rate limiter. Every check is a single
//! "read, compare, conditionally record" step that must not interleave with
//! another caller's check on the same key.

use crate::error::Result;
use crate::value_objects::StoreDecision;
use async_trait::async_trait;
use std::time::Duration;

/// Daily counter observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Admitted requests in the current window
    pub count: u64,
    /// Time until the window expires, if one is open
    pub resets_in: Option<Duration>,
}

/// Shared rate-limit counter store
#[async_trait]
pub trait RateLimitStore: Send + Sync + std::fmt::Debug {
    /// Atomically admit-and-count against a fixed-expiry counter
    ///
    /// The expiry is set only when the counter is created. Admits iff the
    /// value before this call is below `limit`; denied calls are not counted.
    async fn check_daily(&self, key: &str, limit: u64, ttl: Duration) -> Result<StoreDecision>;

    /// Atomically admit-and-record against a sliding window of timestamps
    ///
    /// Prunes timestamps older than `now_ms - window`, then admits iff fewer
    /// than `limit` remain, recording `now_ms` on admission.
    async fn check_burst(
        &self,
        key: &str,
        limit: u64,
        window: Duration,
        now_ms: u64,
    ) -> Result<StoreDecision>;

    /// Read a daily counter without modifying it
    async fn daily_usage(&self, key: &str) -> Result<CounterSnapshot>;

    /// Delete the given keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Delete every key starting with `prefix`, returning how many existed
    async fn delete_prefix(&self, prefix: &str) -> Result<u64>;

    /// Whether checks currently run as atomic server-side scripts
    fn supports_atomic_scripts(&self) -> bool;

    /// Name of this implementation (e.g. "memory", "redis")
    fn provider_name(&self) -> &str;
}
