//! Resilience Service Ports
//!
//! The three leaves the request orchestrator composes. None of them depends
//! on another; each is usable and testable on its own.

use crate::error::Result;
use crate::value_objects::{
    Admission, CacheKey, CacheLookup, CacheStats, CircuitStateInfo, HttpMethod,
    RateLimitUsage, RequestParams, UpstreamResponse,
};
use async_trait::async_trait;
use std::time::Duration;

/// Distributed rate limiter
///
/// `check` never fails: an unreachable store yields [`Admission::Degraded`].
#[async_trait]
pub trait RateLimiterInterface: Send + Sync {
    /// Run the burst and daily checks for one call
    async fn check(&self, provider: &str, operation: &str) -> Admission;

    /// Whether one call may proceed (fail-open)
    async fn admit(&self, provider: &str, operation: &str) -> bool {
        self.check(provider, operation).await.is_admitted()
    }

    /// Current daily usage and configured limits
    async fn get_usage(&self, provider: &str) -> Result<RateLimitUsage>;

    /// Clear every counter for a provider
    async fn reset(&self, provider: &str) -> Result<()>;

    /// Whether quotas are enforced at all
    fn is_enabled(&self) -> bool;
}

/// Per-provider circuit breakers
pub trait CircuitBreakerRegistryInterface: Send + Sync {
    /// Whether a call may execute now; may move OPEN to HALF_OPEN
    fn can_execute(&self, provider: &str) -> bool;

    /// Record a successful call
    fn record_success(&self, provider: &str);

    /// Record a failed call
    fn record_failure(&self, provider: &str);

    /// Read-only view of a provider's breaker
    fn state_info(&self, provider: &str) -> CircuitStateInfo;

    /// Remaining recovery time while OPEN
    fn retry_after(&self, provider: &str) -> Option<Duration>;

    /// Return a provider's breaker to CLOSED
    fn reset(&self, provider: &str);

    /// Views of every breaker created so far
    fn snapshot(&self) -> Vec<CircuitStateInfo>;
}

/// Response cache
///
/// Store faults never surface: reads degrade to misses and writes to no-ops.
#[async_trait]
pub trait ResponseCacheInterface: Send + Sync {
    /// Fingerprint of a logical request
    fn key(
        &self,
        provider: &str,
        method: HttpMethod,
        endpoint: &str,
        params: &RequestParams,
        body: Option<&[u8]>,
    ) -> CacheKey;

    /// Look up a fresh entry
    async fn get(&self, key: &CacheKey) -> CacheLookup;

    /// Store a response; `ttl` overrides the provider's validity window.
    /// Returns whether the write reached the store.
    async fn set(
        &self,
        provider: &str,
        key: &CacheKey,
        response: &UpstreamResponse,
        ttl: Option<Duration>,
    ) -> bool;

    /// Remove one entry
    async fn delete(&self, key: &CacheKey) -> bool;

    /// Remove every entry of one provider, returning how many were removed
    async fn clear(&self, provider: &str) -> u64;

    /// Local hit/miss counters
    fn stats(&self) -> CacheStats;

    /// Whether the cache is consulted at all
    fn is_enabled(&self) -> bool;
}
