//! Provider table configuration types

use crate::config::types::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tollgate_domain::constants::{DEFAULT_BURST_LIMIT, DEFAULT_BURST_WINDOW_SECS, DEFAULT_DAILY_LIMIT};
use tollgate_domain::value_objects::{HttpMethod, RateLimitPolicy};

/// Credential read from the environment and sent as a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAuth {
    /// Environment variable holding the secret
    pub env: String,

    /// Header name (e.g. `authorization`, `x-api-key`)
    #[serde(default = "default_auth_header")]
    pub header: String,

    /// Prefix put before the secret (e.g. `Bearer `)
    #[serde(default)]
    pub prefix: String,
}

fn default_auth_header() -> String {
    "authorization".to_string()
}

/// One provider's address, quotas, cache validity and pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL every endpoint is joined to
    pub base_url: String,

    /// Static headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Optional credential header
    pub auth: Option<ProviderAuth>,

    /// Requests admitted per rolling 24 hours
    pub daily_limit: u64,

    /// Requests admitted per burst window, per operation
    pub burst_limit: u64,

    /// Burst window length in seconds
    pub window_seconds: u64,

    /// Cache validity in seconds; unset uses the cache default, 0 disables caching
    pub cache_ttl_secs: Option<u64>,

    /// Methods whose responses may be cached
    pub cacheable_methods: Vec<HttpMethod>,

    /// Cost charged per successful call unless `costs` lists the operation
    pub cost_per_call: f64,

    /// Per-operation cost (`METHOD:endpoint` to amount)
    pub costs: BTreeMap<String, f64>,

    /// Cost per thousand tokens reported in `usage.total_tokens` of the response
    pub token_cost_per_1k: Option<f64>,

    /// Breaker thresholds overriding the global ones
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl ProviderConfig {
    /// Create a provider entry with default quotas
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Quota policy of this provider
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.daily_limit, self.burst_limit, self.window_seconds)
    }

    /// Set the quotas
    pub fn with_limits(mut self, daily_limit: u64, burst_limit: u64, window_seconds: u64) -> Self {
        self.daily_limit = daily_limit;
        self.burst_limit = burst_limit;
        self.window_seconds = window_seconds;
        self
    }

    /// Set the cache validity in seconds
    pub fn with_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = Some(ttl_secs);
        self
    }

    /// Set the flat per-call cost
    pub fn with_cost_per_call(mut self, cost: f64) -> Self {
        self.cost_per_call = cost;
        self
    }

    /// Set the cost of one operation
    pub fn with_operation_cost(mut self, operation: impl Into<String>, cost: f64) -> Self {
        self.costs.insert(operation.into(), cost);
        self
    }

    /// Set the methods whose responses may be cached
    pub fn with_cacheable_methods(mut self, methods: Vec<HttpMethod>) -> Self {
        self.cacheable_methods = methods;
        self
    }

    /// Set a credential header
    pub fn with_auth(mut self, env: &str, header: &str, prefix: &str) -> Self {
        self.auth = Some(ProviderAuth {
            env: env.to_string(),
            header: header.to_string(),
            prefix: prefix.to_string(),
        });
        self
    }

    /// Override breaker thresholds for this provider
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(config);
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headers: BTreeMap::new(),
            auth: None,
            daily_limit: DEFAULT_DAILY_LIMIT,
            burst_limit: DEFAULT_BURST_LIMIT,
            window_seconds: DEFAULT_BURST_WINDOW_SECS,
            cache_ttl_secs: None,
            cacheable_methods: vec![HttpMethod::Get, HttpMethod::Head],
            cost_per_call: 0.0,
            costs: BTreeMap::new(),
            token_cost_per_1k: None,
            circuit_breaker: None,
        }
    }
}
