//! Value Objects
//!
//! Immutable types shared by every layer of the gateway.

/// Response cache keys, entry config and lookup results
pub mod cache;
/// Circuit breaker state and settings
pub mod circuit;
/// Provider health reports
pub mod health;
/// Rate-limit policy, usage and admission results
pub mod rate_limit;
/// Outbound request types
pub mod request;
/// Upstream response payload
pub mod response;

pub use cache::{CacheEntryConfig, CacheKey, CacheLookup, CacheStats, cache_index_key, canonical_json};
pub use circuit::{CircuitBreakerSettings, CircuitState, CircuitStateInfo};
pub use health::{ProviderHealthReport, ProviderHealthStatus};
pub use rate_limit::{
    Admission, RateLimitDenial, RateLimitPolicy, RateLimitScope, RateLimitUsage, StoreDecision,
    burst_key, daily_key,
};
pub use request::{HttpMethod, RequestContext, RequestParams, UpstreamRequest};
pub use response::UpstreamResponse;
