//! Shared-store configuration types

use crate::constants::{DEFAULT_REDIS_URL, DEFAULT_STORE_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend holding rate-limit counters and cached responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store; quotas are not shared between processes
    #[default]
    Memory,
    /// Redis, shared by every process pointing at the same server
    Redis,
}

/// Shared-store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which backend to use
    pub backend: StoreBackend,

    /// Redis connection URL (used by the redis backend)
    pub redis_url: String,

    /// Upper bound for a single store operation, in milliseconds
    pub timeout_ms: u64,
}

impl StoreConfig {
    /// Operation timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}
