//! In-memory rate-limit store
//!
//! Same semantics as the Redis store for single-process deployments and
//! tests. Each check holds the `DashMap` shard lock of its key for the whole
//! read-compare-record step, so concurrent callers on one key serialize.

use crate::clock::SystemClock;
use crate::constants::RATE_LIMIT_MEMORY_MAX_WINDOWS;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tollgate_domain::error::Result;
use tollgate_domain::ports::{Clock, CounterSnapshot, RateLimitStore};
use tollgate_domain::value_objects::StoreDecision;

#[derive(Debug, Clone, Copy)]
struct DailyCounter {
    count: u64,
    expires_at: Instant,
}

/// Burst windows: admitted timestamps (unix millis), oldest first
type SlidingWindowData = DashMap<String, VecDeque<u64>>;

/// In-memory rate-limit store
#[derive(Debug)]
pub struct MemoryRateLimitStore {
    daily: DashMap<String, DailyCounter>,
    windows: SlidingWindowData,
    clock: Arc<dyn Clock>,
    max_windows: usize,
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRateLimitStore {
    /// Create a store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store whose daily expiry reads the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            daily: DashMap::new(),
            windows: DashMap::new(),
            clock,
            max_windows: RATE_LIMIT_MEMORY_MAX_WINDOWS,
        }
    }

    /// Drop burst windows with nothing left in them
    fn prune_idle_windows(&self, cutoff_ms: u64) {
        if self.windows.len() <= self.max_windows {
            return;
        }
        self.windows.retain(|_, window| {
            while window.front().is_some_and(|&ts| ts <= cutoff_ms) {
                window.pop_front();
            }
            !window.is_empty()
        });
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn check_daily(&self, key: &str, limit: u64, ttl: Duration) -> Result<StoreDecision> {
        let now = self.clock.now();
        let mut entry = self.daily.entry(key.to_string()).or_insert(DailyCounter {
            count: 0,
            expires_at: now + ttl,
        });
        let counter = entry.value_mut();

        if now >= counter.expires_at {
            counter.count = 0;
        }

        if counter.count >= limit {
            return Ok(StoreDecision::denied(
                counter.count,
                counter.expires_at.saturating_duration_since(now),
            ));
        }

        if counter.count == 0 {
            counter.expires_at = now + ttl;
        }
        counter.count += 1;
        Ok(StoreDecision::admitted(counter.count))
    }

    async fn check_burst(
        &self,
        key: &str,
        limit: u64,
        window: Duration,
        now_ms: u64,
    ) -> Result<StoreDecision> {
        let window_ms = window.as_millis() as u64;
        let cutoff = now_ms.saturating_sub(window_ms);
        self.prune_idle_windows(cutoff);

        let mut entry = self.windows.entry(key.to_string()).or_default();
        let timestamps = entry.value_mut();

        while timestamps.front().is_some_and(|&ts| ts <= cutoff) {
            timestamps.pop_front();
        }

        let count = timestamps.len() as u64;
        if count >= limit {
            let retry_ms = timestamps
                .front()
                .map_or(window_ms, |&oldest| (oldest + window_ms).saturating_sub(now_ms));
            return Ok(StoreDecision::denied(count, Duration::from_millis(retry_ms)));
        }

        timestamps.push_back(now_ms);
        Ok(StoreDecision::admitted(count + 1))
    }

    async fn daily_usage(&self, key: &str) -> Result<CounterSnapshot> {
        let now = self.clock.now();
        Ok(self
            .daily
            .get(key)
            .filter(|counter| now < counter.expires_at && counter.count > 0)
            .map(|counter| CounterSnapshot {
                count: counter.count,
                resets_in: Some(counter.expires_at.saturating_duration_since(now)),
            })
            .unwrap_or_default())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        let mut removed = 0;
        for key in keys {
            if self.daily.remove(key).is_some() {
                removed += 1;
            }
            if self.windows.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64> {
        let before = self.daily.len() + self.windows.len();
        self.daily.retain(|key, _| !key.starts_with(prefix));
        self.windows.retain(|key, _| !key.starts_with(prefix));
        let after = self.daily.len() + self.windows.len();
        Ok(before.saturating_sub(after) as u64)
    }

    fn supports_atomic_scripts(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
