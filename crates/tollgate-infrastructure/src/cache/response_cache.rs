//! Response cache
//!
//! Maps request fingerprints to previously observed upstream responses.
//! Entries are indexed under their provider so one provider's entries can be
//! cleared without touching the rest.
//!
//! A store fault is never surfaced. Reads degrade to misses and writes to
//! no-ops, and both are counted in the local statistics.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tollgate_domain::constants::DEFAULT_CACHE_TTL_SECS;
use tollgate_domain::ports::{CacheProvider, ResponseCacheInterface};
use tollgate_domain::value_objects::{
    CacheEntryConfig, CacheKey, CacheLookup, CacheStats, HttpMethod, RequestParams,
    UpstreamResponse,
};
use tracing::{debug, warn};

/// Static per-provider validity windows with a default for unlisted providers
///
/// A zero TTL means the provider's responses are never cached.
#[derive(Debug, Clone)]
pub struct CacheTtlPolicy {
    ttls: HashMap<String, Duration>,
    default_ttl: Duration,
}

impl CacheTtlPolicy {
    /// Create a policy with the given default
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            ttls: HashMap::new(),
            default_ttl,
        }
    }

    /// Set a provider's TTL
    pub fn with_ttl(mut self, provider: impl Into<String>, ttl: Duration) -> Self {
        self.ttls.insert(provider.into(), ttl);
        self
    }

    /// Insert a provider's TTL
    pub fn insert(&mut self, provider: impl Into<String>, ttl: Duration) {
        self.ttls.insert(provider.into(), ttl);
    }

    /// TTL applied to a provider
    pub fn ttl_for(&self, provider: &str) -> Duration {
        self.ttls
            .get(provider)
            .copied()
            .unwrap_or(self.default_ttl)
    }
}

impl Default for CacheTtlPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

/// Fingerprinting response cache over a [`CacheProvider`]
#[derive(Debug)]
pub struct ResponseCache {
    store: Arc<dyn CacheProvider>,
    policy: CacheTtlPolicy,
    counters: Counters,
    enabled: bool,
}

impl ResponseCache {
    /// Create an enabled cache
    pub fn new(store: Arc<dyn CacheProvider>, policy: CacheTtlPolicy) -> Self {
        Self {
            store,
            policy,
            counters: Counters::default(),
            enabled: true,
        }
    }

    /// Bypass the cache entirely (stub mode or disabled by configuration)
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// TTL applied to a provider
    pub fn ttl_for(&self, provider: &str) -> Duration {
        self.policy.ttl_for(provider)
    }

    /// Name of the backing store implementation
    pub fn store_name(&self) -> &str {
        self.store.provider_name()
    }

    fn miss(&self) -> CacheLookup {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        CacheLookup::Miss
    }

    fn degraded(&self, reason: String) -> CacheLookup {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        CacheLookup::Degraded { reason }
    }
}

#[async_trait]
impl ResponseCacheInterface for ResponseCache {
    fn key(
        &self,
        provider: &str,
        method: HttpMethod,
        endpoint: &str,
        params: &RequestParams,
        body: Option<&[u8]>,
    ) -> CacheKey {
        CacheKey::derive(provider, method, endpoint, params, body)
    }

    async fn get(&self, key: &CacheKey) -> CacheLookup {
        if !self.enabled {
            return CacheLookup::Miss;
        }

        match self.store.get_json(key.as_str()).await {
            Ok(Some(json)) => match serde_json::from_str::<UpstreamResponse>(&json) {
                Ok(mut response) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    response.cached = true;
                    debug!(key = %key, "Cache hit");
                    CacheLookup::Hit(response)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                    self.degraded(format!("unreadable entry: {e}"))
                }
            },
            Ok(None) => self.miss(),
            Err(e) => {
                warn!(
                    key = %key,
                    store = self.store.provider_name(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                self.degraded(e.to_string())
            }
        }
    }

    async fn set(
        &self,
        provider: &str,
        key: &CacheKey,
        response: &UpstreamResponse,
        ttl: Option<Duration>,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        let ttl = ttl.unwrap_or_else(|| self.policy.ttl_for(provider));
        if ttl.is_zero() {
            return false;
        }

        let json = match serde_json::to_string(response) {
            Ok(json) => json,
            Err(e) => {
                warn!(provider, key = %key, error = %e, "Failed to serialize response for cache");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                return false;
            }
        };

        let config = CacheEntryConfig::new()
            .with_ttl(ttl)
            .with_namespace(provider);
        match self.store.set_json(key.as_str(), &json, config).await {
            Ok(()) => {
                debug!(provider, key = %key, ttl_secs = ttl.as_secs(), "Cached response");
                true
            }
            Err(e) => {
                warn!(provider, key = %key, error = %e, "Cache write failed, skipping");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    async fn delete(&self, key: &CacheKey) -> bool {
        match self.store.delete(key.as_str()).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache delete failed");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    async fn clear(&self, provider: &str) -> u64 {
        match self.store.clear_namespace(provider).await {
            Ok(removed) => {
                debug!(provider, removed, "Cleared provider cache");
                removed
            }
            Err(e) => {
                warn!(provider, error = %e, "Cache clear failed");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                0
            }
        }
    }

    fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            hit_rate: 0.0,
        };
        stats.hit_rate = stats.calculate_hit_rate();
        stats
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
