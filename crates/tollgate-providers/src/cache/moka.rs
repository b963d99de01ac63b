//! Moka in-memory cache provider
//!
//! Concurrent in-memory cache for single-process deployments and tests.
//! Each entry carries its own TTL. Expiry is checked against the injected
//! [`Clock`] on every read, so a [`ManualClock`](crate::clock::ManualClock)
//! can expire entries without sleeping.
//!
//! The namespace index only holds live keys: reads drop expired entries from
//! it and an eviction listener drops entries moka expires or evicts itself.
//!
//! ## Example
//!
//! ```ignore
//! use tollgate_providers::cache::MokaCacheProvider;
//!
//! let provider = MokaCacheProvider::with_capacity(1_000);
//! ```

use crate::clock::SystemClock;
use crate::constants::CACHE_DEFAULT_MAX_ENTRIES;
use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tollgate_domain::error::Result;
use tollgate_domain::ports::{CacheProvider, Clock};
use tollgate_domain::value_objects::{CacheEntryConfig, CacheStats};

#[derive(Debug, Clone)]
struct CachedValue {
    json: Arc<str>,
    ttl: Duration,
    expires_at: Instant,
    namespace: Option<Arc<str>>,
}

type NamespaceIndex = DashMap<String, HashSet<String>>;

fn unindex(index: &NamespaceIndex, namespace: &str, key: &str) {
    if let Some(mut keys) = index.get_mut(namespace) {
        keys.remove(key);
    }
    index.remove_if(namespace, |_, keys| keys.is_empty());
}

struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache provider
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<String, CachedValue>,
    index: Arc<NamespaceIndex>,
    clock: Arc<dyn Clock>,
    max_entries: u64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a new Moka cache provider with default settings
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_ENTRIES)
    }

    /// Create a new Moka cache provider with specified capacity
    pub fn with_capacity(max_entries: u64) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Create a provider whose expiry checks read the given clock
    pub fn with_clock(max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let index = Arc::new(NamespaceIndex::new());
        let listener_index = Arc::clone(&index);
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .eviction_listener(move |key: Arc<String>, value: CachedValue, cause| {
                // A replaced key is still cached under the same namespace
                if cause == RemovalCause::Replaced {
                    return;
                }
                if let Some(namespace) = &value.namespace {
                    unindex(&listener_index, namespace, &key);
                }
            })
            .build();

        Self {
            cache,
            index,
            clock,
            max_entries,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the maximum capacity of the cache
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    async fn live_entry(&self, key: &str) -> Option<CachedValue> {
        let entry = self.cache.get(key).await?;
        if self.clock.now() >= entry.expires_at {
            self.cache.invalidate(key).await;
            if let Some(namespace) = &entry.namespace {
                unindex(&self.index, namespace, key);
            }
            return None;
        }
        Some(entry)
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        if let Some(entry) = self.live_entry(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Ok(Some(entry.json.to_string()))
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        }
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let ttl = config.effective_ttl();
        let entry = CachedValue {
            json: Arc::from(value),
            ttl,
            expires_at: self.clock.now() + ttl,
            namespace: config.namespace.as_deref().map(Arc::from),
        };

        if let Some(namespace) = config.namespace {
            self.index
                .entry(namespace)
                .or_default()
                .insert(key.to_string());
        }
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let Some(entry) = self.cache.remove(key).await else {
            return Ok(false);
        };
        if let Some(namespace) = &entry.namespace {
            unindex(&self.index, namespace, key);
        }
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn clear_namespace(&self, namespace: &str) -> Result<u64> {
        let Some((_, keys)) = self.index.remove(namespace) else {
            return Ok(0);
        };

        let mut removed = 0;
        for key in keys {
            if self.cache.remove(&key).await.is_some() {
                removed += 1;
            }
        }
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
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_entries", &self.max_entries)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
