//! Cache provider whose store is unreachable
//!
//! Every operation fails with an infrastructure error, the way a Redis cache
//! behaves while the server is down.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tollgate_domain::error::{Error, Result};
use tollgate_domain::ports::CacheProvider;
use tollgate_domain::value_objects::{CacheEntryConfig, CacheStats};

/// Always-failing cache provider
#[derive(Debug, Default)]
pub struct FailingCacheProvider {
    attempts: AtomicU64,
}

impl FailingCacheProvider {
    /// Create a failing provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations attempted so far
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn fail<T>(&self, op: &str) -> Result<T> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(Error::infrastructure(format!("cache store unreachable during {op}")))
    }
}

#[async_trait]
impl CacheProvider for FailingCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        self.fail("GET")
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        self.fail("SET")
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        self.fail("DEL")
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        self.fail("EXISTS")
    }

    async fn clear_namespace(&self, _namespace: &str) -> Result<u64> {
        self.fail("SMEMBERS")
    }

    async fn stats(&self) -> Result<CacheStats> {
        self.fail("STATS")
    }

    fn provider_name(&self) -> &str {
        "failing"
    }
}
