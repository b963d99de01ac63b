//! Gateway Service Use Case
//!
//! For every outbound call, in order:
//!
//! 1. Cache lookup. A hit returns immediately with no quota, circuit or
//!    network interaction.
//! 2. Rate limiter. A denial fails with `RateLimitExceeded`.
//! 3. Circuit breaker. A denial fails with `CircuitOpen` without touching
//!    the network.
//! 4. Bounded upstream call.
//! 5. Failure (status >= 400, transport error, timeout): breaker failure,
//!    `Upstream` error.
//! 6. Success: breaker success, cache write, cost and call metrics.

use crate::domain_services::{GatewayServiceInterface, ResetSummary};
use crate::use_cases::provider_catalog::ProviderCatalog;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tollgate_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use tollgate_domain::error::{Error, GatewayError, Result};
use tollgate_domain::ports::{
    CircuitBreakerRegistryInterface, ProviderProfile, RateLimiterInterface,
    ResponseCacheInterface, UpstreamTransport, UsageRecorder,
};
use tollgate_domain::value_objects::{
    Admission, CacheKey, CacheLookup, ProviderHealthReport, RateLimitUsage, RequestContext,
    UpstreamRequest, UpstreamResponse,
};
use tracing::{debug, warn};

/// Status label recorded for transport-level failures
const STATUS_TRANSPORT_ERROR: &str = "transport_error";
/// Status label recorded for timed-out calls
const STATUS_TIMEOUT: &str = "timeout";

/// Provider-agnostic request orchestrator
pub struct GatewayServiceImpl {
    catalog: ProviderCatalog,
    rate_limiter: Arc<dyn RateLimiterInterface>,
    breakers: Arc<dyn CircuitBreakerRegistryInterface>,
    cache: Arc<dyn ResponseCacheInterface>,
    transport: Arc<dyn UpstreamTransport>,
    recorder: Arc<dyn UsageRecorder>,
    timeout: Duration,
}

impl GatewayServiceImpl {
    /// Create the orchestrator with injected services
    pub fn new(
        catalog: ProviderCatalog,
        rate_limiter: Arc<dyn RateLimiterInterface>,
        breakers: Arc<dyn CircuitBreakerRegistryInterface>,
        cache: Arc<dyn ResponseCacheInterface>,
        transport: Arc<dyn UpstreamTransport>,
        recorder: Arc<dyn UsageRecorder>,
    ) -> Self {
        Self {
            catalog,
            rate_limiter,
            breakers,
            cache,
            transport,
            recorder,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Bound every upstream call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured providers
    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// The usage recorder calls are reported to
    pub fn recorder(&self) -> &Arc<dyn UsageRecorder> {
        &self.recorder
    }

    fn profile(&self, provider: &str) -> std::result::Result<&Arc<dyn ProviderProfile>, GatewayError> {
        self.catalog.get(provider).ok_or_else(|| {
            GatewayError::configuration(format!("Unknown provider: {provider}"))
        })
    }

    async fn lookup(&self, key: &CacheKey) -> Option<UpstreamResponse> {
        match self.cache.get(key).await {
            CacheLookup::Hit(response) => Some(response),
            CacheLookup::Miss => None,
            CacheLookup::Degraded { reason } => {
                debug!(key = %key, reason = %reason, "Cache degraded, continuing as miss");
                None
            }
        }
    }

    /// Admit through the rate limiter, turning a denial into the caller-visible error
    async fn admit(&self, request: &RequestContext) -> std::result::Result<(), GatewayError> {
        let operation = request.operation();
        match self.rate_limiter.check(&request.provider, &operation).await {
            Admission::Admitted => Ok(()),
            Admission::Degraded { reason } => {
                debug!(provider = %request.provider, reason = %reason, "Rate limiter degraded, admitting");
                Ok(())
            }
            Admission::Denied(denial) => {
                self.recorder
                    .record_rate_limited(&request.provider, denial.scope);
                Err(GatewayError::RateLimitExceeded {
                    provider: request.provider.clone(),
                    scope: denial.scope,
                    retry_after: denial.retry_after,
                    usage: denial.usage,
                })
            }
        }
    }

    /// Perform the bounded upstream call; `Err` carries the status label to record
    async fn call_upstream(
        &self,
        upstream: UpstreamRequest,
    ) -> std::result::Result<UpstreamResponse, (String, Option<u16>, String)> {
        match tokio::time::timeout(self.timeout, self.transport.send(upstream)).await {
            Ok(Ok(response)) if response.is_success() => Ok(response),
            Ok(Ok(response)) => Err((
                response.status.to_string(),
                Some(response.status),
                response.error_message(),
            )),
            Ok(Err(e)) => Err((STATUS_TRANSPORT_ERROR.to_string(), None, e.to_string())),
            Err(_) => Err((
                STATUS_TIMEOUT.to_string(),
                None,
                format!("Request timed out after {}s", self.timeout.as_secs_f64()),
            )),
        }
    }
}

impl std::fmt::Debug for GatewayServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayServiceImpl")
            .field("providers", &self.catalog.len())
            .field("timeout", &self.timeout)
            .field("cache_enabled", &self.cache.is_enabled())
            .field("rate_limit_enabled", &self.rate_limiter.is_enabled())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GatewayServiceInterface for GatewayServiceImpl {
    async fn execute(
        &self,
        request: RequestContext,
    ) -> std::result::Result<UpstreamResponse, GatewayError> {
        let profile = Arc::clone(self.profile(&request.provider)?);
        let provider = request.provider.as_str();
        let endpoint = request.endpoint.as_str();

        let cache_key = (self.cache.is_enabled() && profile.cacheable(&request)).then(|| {
            self.cache
                .key(
                    provider,
                    request.method,
                    endpoint,
                    &request.params,
                    request.body.as_deref(),
                )
        });

        if let Some(key) = &cache_key {
            if let Some(response) = self.lookup(key).await {
                self.recorder.record_cache_hit(provider);
                return Ok(response);
            }
            self.recorder.record_cache_miss(provider);
        }

        self.admit(&request).await?;

        if !self.breakers.can_execute(provider) {
            let retry_after = self.breakers.retry_after(provider).unwrap_or_default();
            debug!(provider, "Circuit open, refusing call");
            return Err(GatewayError::CircuitOpen {
                provider: provider.to_string(),
                retry_after,
            });
        }

        let upstream = match UpstreamRequest::from_context(
            &request,
            profile.base_url(),
            profile.headers(),
            self.timeout,
        ) {
            Ok(upstream) => upstream,
            Err(e) => {
                // Admitted as a trial call but never sent: release it as a failure
                self.breakers.record_failure(provider);
                return Err(GatewayError::configuration(format!(
                    "Cannot build request for {provider}: {e}"
                )));
            }
        };

        let started = Instant::now();
        let outcome = self.call_upstream(upstream).await;
        let latency = started.elapsed();

        match outcome {
            Err((status_label, status, message)) => {
                self.breakers.record_failure(provider);
                self.recorder
                    .record_call(provider, endpoint, &status_label, latency);
                warn!(provider, endpoint, status = %status_label, message = %message, "Upstream call failed");
                Err(GatewayError::upstream(provider, status, message))
            }
            Ok(response) => {
                self.breakers.record_success(provider);
                if let Some(key) = &cache_key {
                    self.cache
                        .set(provider, key, &response, Some(profile.cache_ttl()))
                        .await;
                }
                let cost = profile.cost(&request.operation(), &response);
                self.recorder.record_cost(provider, endpoint, cost);
                self.recorder
                    .record_call(provider, endpoint, &response.status.to_string(), latency);
                debug!(
                    provider,
                    endpoint,
                    status = response.status,
                    latency_ms = latency.as_millis() as u64,
                    cost,
                    "Upstream call succeeded"
                );
                Ok(response)
            }
        }
    }

    async fn health_check(&self) -> Vec<ProviderHealthReport> {
        let mut reports = Vec::with_capacity(self.catalog.len());
        for name in self.catalog.names() {
            let circuit = self.breakers.state_info(name);
            let usage = if self.rate_limiter.is_enabled() {
                match self.rate_limiter.get_usage(name).await {
                    Ok(usage) => Some(usage),
                    Err(e) => {
                        warn!(provider = name, error = %e, "Usage unavailable for health report");
                        None
                    }
                }
            } else {
                None
            };
            reports.push(ProviderHealthReport::new(name, circuit.state, usage));
        }
        reports
    }

    async fn usage(&self, provider: &str) -> Result<RateLimitUsage> {
        if self.catalog.get(provider).is_none() {
            return Err(Error::invalid_argument(format!(
                "Unknown provider: {provider}"
            )));
        }
        self.rate_limiter.get_usage(provider).await
    }

    async fn reset_provider(&self, provider: &str) -> Result<ResetSummary> {
        if self.catalog.get(provider).is_none() {
            return Err(Error::invalid_argument(format!(
                "Unknown provider: {provider}"
            )));
        }
        self.rate_limiter.reset(provider).await?;
        let cache_entries_removed = self.cache.clear(provider).await;
        self.breakers.reset(provider);
        Ok(ResetSummary {
            cache_entries_removed,
        })
    }
}
