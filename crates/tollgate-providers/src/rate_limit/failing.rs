//! Rate-limit store whose backend is unreachable
//!
//! Every operation fails the way a Redis store does while the server is
//! down. Used to exercise fail-open behavior.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tollgate_domain::error::{Error, Result};
use tollgate_domain::ports::{CounterSnapshot, RateLimitStore};
use tollgate_domain::value_objects::StoreDecision;

/// Always-failing rate-limit store
#[derive(Debug, Default)]
pub struct FailingRateLimitStore {
    attempts: AtomicU64,
}

impl FailingRateLimitStore {
    /// Create a failing store
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations attempted so far
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn fail<T>(&self) -> Result<T> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(Error::infrastructure(
            "Failed to connect to Redis: Connection refused (os error 111)",
        ))
    }
}

#[async_trait]
impl RateLimitStore for FailingRateLimitStore {
    async fn check_daily(&self, _key: &str, _limit: u64, _ttl: Duration) -> Result<StoreDecision> {
        self.fail()
    }

    async fn check_burst(
        &self,
        _key: &str,
        _limit: u64,
        _window: Duration,
        _now_ms: u64,
    ) -> Result<StoreDecision> {
        self.fail()
    }

    async fn daily_usage(&self, _key: &str) -> Result<CounterSnapshot> {
        self.fail()
    }

    async fn delete(&self, _keys: &[String]) -> Result<u64> {
        self.fail()
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<u64> {
        self.fail()
    }

    fn supports_atomic_scripts(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &str {
        "failing"
    }
}
