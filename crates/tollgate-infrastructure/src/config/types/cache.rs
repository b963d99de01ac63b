//! Cache configuration types

use serde::{Deserialize, Serialize};
use tollgate_domain::constants::DEFAULT_CACHE_TTL_SECS;
use tollgate_providers::constants::CACHE_DEFAULT_MAX_ENTRIES;

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache enabled
    pub enabled: bool,

    /// TTL for providers that do not set their own, in seconds
    pub default_ttl_secs: u64,

    /// Capacity of the in-memory store (memory backend only)
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_entries: CACHE_DEFAULT_MAX_ENTRIES,
        }
    }
}
