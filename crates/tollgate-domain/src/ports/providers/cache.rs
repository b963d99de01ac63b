//! Cache Provider Port
//!
//! Port for the store behind the response cache. Implementations include an
//! in-memory store (Moka) for single-process deployments and tests, Redis for
//! sharing entries across processes, and a null store for disabled caching.

use crate::error::Result;
use crate::value_objects::{CacheEntryConfig, CacheStats};
use async_trait::async_trait;

/// Cache Provider Port
///
/// JSON-string storage with TTL support. When `CacheEntryConfig::namespace`
/// is set the key is also recorded in that namespace's index so
/// [`CacheProvider::clear_namespace`] can remove it later.
///
/// # Example
///
/// ```ignore
/// let config = CacheEntryConfig::default()
///     .with_ttl(Duration::from_secs(600))
///     .with_namespace("serpapi");
/// cache.set_json("api_cache:ab12..", &payload, config).await?;
///
/// if let Some(json) = cache.get_json("api_cache:ab12..").await? {
///     let response: UpstreamResponse = serde_json::from_str(&json)?;
/// }
/// ```
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Get a value from the cache as JSON string
    ///
    /// Returns `None` if the key is absent or its TTL has elapsed.
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Set a value in the cache from JSON string
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Delete a value from the cache
    ///
    /// Returns true if the key was deleted, false if it didn't exist
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check if a live key exists in the cache
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove every entry indexed under a namespace, returning how many were removed
    async fn clear_namespace(&self, namespace: &str) -> Result<u64>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Name of this implementation (e.g. "moka", "redis", "null")
    fn provider_name(&self) -> &str;
}
