//! Null cache provider
//!
//! Stores nothing. Used when caching is disabled.

use async_trait::async_trait;
use tollgate_domain::error::Result;
use tollgate_domain::ports::CacheProvider;
use tollgate_domain::value_objects::{CacheEntryConfig, CacheStats};

/// Null cache provider that doesn't store anything
#[derive(Debug, Clone, Default)]
pub struct NullCacheProvider;

impl NullCacheProvider {
    /// Create a new null cache provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear_namespace(&self, _namespace: &str) -> Result<u64> {
        Ok(0)
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats::default())
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
