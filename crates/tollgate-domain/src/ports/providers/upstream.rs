//! Upstream Ports
//!
//! [`UpstreamTransport`] performs the network call; [`ProviderProfile`]
//! describes one third-party provider (address, headers, quotas, cache
//! validity and pricing) so a single provider-agnostic orchestrator can serve
//! all of them.

use crate::error::Result;
use crate::value_objects::{RateLimitPolicy, RequestContext, UpstreamRequest, UpstreamResponse};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Sends a concrete request to a provider
///
/// Transport-level failures (connection refused, timeout, TLS) are returned
/// as `Err`; an HTTP response with any status is `Ok`.
#[async_trait]
pub trait UpstreamTransport: Send + Sync + std::fmt::Debug {
    /// Perform the request
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse>;

    /// Whether this transport simulates upstreams instead of calling them
    fn is_stub(&self) -> bool {
        false
    }
}

/// Static description of one provider
pub trait ProviderProfile: Send + Sync + std::fmt::Debug {
    /// Provider identifier
    fn name(&self) -> &str;

    /// Base URL every endpoint is joined to
    fn base_url(&self) -> &str;

    /// Headers sent with every request (auth, versioning)
    fn headers(&self) -> BTreeMap<String, String>;

    /// Daily and burst quotas
    fn rate_limit_policy(&self) -> RateLimitPolicy;

    /// Validity window for cached responses
    fn cache_ttl(&self) -> Duration;

    /// Estimated monetary cost of one successful call
    fn cost(&self, operation: &str, response: &UpstreamResponse) -> f64;

    /// Whether responses to this request may be cached
    fn cacheable(&self, _ctx: &RequestContext) -> bool {
        !self.cache_ttl().is_zero()
    }
}
