//! Main application configuration

use crate::config::types::{
    CacheConfig, CircuitBreakerConfig, LoggingConfig, MetricsConfig, ProviderConfig,
    RateLimitConfig, StoreConfig, UpstreamConfig,
};
use crate::providers::builtin_providers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulated upstreams: caching and rate limiting are bypassed
    pub stub_mode: bool,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Shared-store configuration
    pub store: StoreConfig,

    /// Response cache configuration
    pub cache: CacheConfig,

    /// Rate limiter configuration
    pub rate_limit: RateLimitConfig,

    /// Circuit breaker defaults
    pub circuit_breaker: CircuitBreakerConfig,

    /// Upstream call configuration
    pub upstream: UpstreamConfig,

    /// Usage/cost recorder configuration
    pub metrics: MetricsConfig,

    /// Provider table keyed by provider name
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stub_mode: false,
            logging: LoggingConfig::default(),
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            upstream: UpstreamConfig::default(),
            metrics: MetricsConfig::default(),
            providers: builtin_providers(),
        }
    }
}

impl AppConfig {
    /// Configuration with an empty provider table
    pub fn without_providers() -> Self {
        Self {
            providers: BTreeMap::new(),
            ..Self::default()
        }
    }
}
