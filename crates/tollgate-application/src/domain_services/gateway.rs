//! Gateway service interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tollgate_domain::error::{GatewayError, Result};
use tollgate_domain::value_objects::{
    ProviderHealthReport, RateLimitUsage, RequestContext, UpstreamResponse,
};

/// What a provider reset removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    /// Cache entries removed
    pub cache_entries_removed: u64,
}

/// The request orchestrator
#[async_trait]
pub trait GatewayServiceInterface: Send + Sync {
    /// Run one outbound call through cache, quota, circuit and upstream
    ///
    /// Only rate-limit denials, circuit denials, upstream failures and
    /// configuration errors come back as errors; internal faults of the
    /// cache, metrics and rate-limit store are absorbed.
    async fn execute(&self, request: RequestContext) -> std::result::Result<UpstreamResponse, GatewayError>;

    /// Breaker state and quota usage for every configured provider
    async fn health_check(&self) -> Vec<ProviderHealthReport>;

    /// Current daily usage of one provider
    async fn usage(&self, provider: &str) -> Result<RateLimitUsage>;

    /// Clear quotas, cached responses and breaker state of one provider
    async fn reset_provider(&self, provider: &str) -> Result<ResetSummary>;
}
