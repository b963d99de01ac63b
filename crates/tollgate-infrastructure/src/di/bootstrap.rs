//! Gateway Bootstrap
//!
//! ```text
//! AppConfig → stores (memory | redis) → RateLimiter / ResponseCache
//!           → CircuitBreakerRegistry ─┐
//!           → ProviderCatalog ────────┼→ GatewayServiceImpl
//!           → transport (reqwest | stub)
//!           → recorder (prometheus | null)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! let context = init_app(config).await?;
//!
//! let response = context.gateway().execute(request).await?;
//! let health = context.health_report().await;
//! ```

use crate::cache::{CacheTtlPolicy, ResponseCache};
use crate::config::{AppConfig, StoreBackend};
use crate::health::{HealthRegistry, HealthResponse};
use crate::health::checkers::{CacheStoreHealthChecker, RateLimitStoreHealthChecker};
use crate::metrics::{NullUsageRecorder, PrometheusUsageRecorder};
use crate::providers::ConfiguredProvider;
use crate::resilience::{CircuitBreakerRegistry, RateLimitPolicies, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tollgate_application::{GatewayServiceImpl, GatewayServiceInterface, ProviderCatalog};
use tollgate_domain::error::Result;
use tollgate_domain::ports::{
    CacheProvider, Clock, CollectorSummary, RateLimitStore, RateLimiterInterface,
    ResponseCacheInterface, UpstreamTransport, UsageRecorder,
};
use tollgate_providers::SystemClock;
use tollgate_providers::cache::{MokaCacheProvider, NullCacheProvider, RedisCacheProvider};
use tollgate_providers::http::{HttpClientConfig, ReqwestTransport, StubTransport};
use tollgate_providers::rate_limit::{MemoryRateLimitStore, RedisRateLimitStore};
use tracing::info;

/// Wired gateway with direct access to every service
pub struct TollgateContext {
    /// Effective configuration
    pub config: Arc<AppConfig>,

    gateway: Arc<GatewayServiceImpl>,
    rate_limiter: Arc<RateLimiter>,
    breakers: Arc<CircuitBreakerRegistry>,
    cache: Arc<ResponseCache>,
    recorder: Arc<dyn UsageRecorder>,
    prometheus: Option<Arc<PrometheusUsageRecorder>>,
    health: HealthRegistry,
}

impl TollgateContext {
    /// The request orchestrator
    pub fn gateway(&self) -> Arc<GatewayServiceImpl> {
        Arc::clone(&self.gateway)
    }

    /// The rate limiter
    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.rate_limiter)
    }

    /// The circuit breaker registry
    pub fn breakers(&self) -> Arc<CircuitBreakerRegistry> {
        Arc::clone(&self.breakers)
    }

    /// The response cache
    pub fn cache(&self) -> Arc<ResponseCache> {
        Arc::clone(&self.cache)
    }

    /// The usage recorder
    pub fn recorder(&self) -> Arc<dyn UsageRecorder> {
        Arc::clone(&self.recorder)
    }

    /// The Prometheus recorder, when metrics are enabled
    pub fn prometheus(&self) -> Option<Arc<PrometheusUsageRecorder>> {
        self.prometheus.clone()
    }

    /// Store health checkers
    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    /// Store checks combined with per-provider circuit and quota state
    pub async fn health_report(&self) -> HealthResponse {
        let providers = self.gateway.health_check().await;
        self.health
            .perform_health_checks()
            .await
            .with_providers(providers)
    }

    /// Collector summary
    pub fn usage_summary(&self) -> Vec<CollectorSummary> {
        self.recorder.summary()
    }

    /// Prometheus text exposition, `None` when metrics are disabled
    pub fn metrics_text(&self) -> Option<Result<String>> {
        self.prometheus.as_ref().map(|recorder| recorder.render())
    }
}

impl std::fmt::Debug for TollgateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TollgateContext")
            .field("stub_mode", &self.config.stub_mode)
            .field("gateway", &self.gateway)
            .field("metrics", &self.prometheus.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`TollgateContext`]
///
/// Anything not injected is derived from the configuration.
pub struct ContextBuilder {
    config: AppConfig,
    clock: Option<Arc<dyn Clock>>,
    rate_limit_store: Option<Arc<dyn RateLimitStore>>,
    cache_store: Option<Arc<dyn CacheProvider>>,
    transport: Option<Arc<dyn UpstreamTransport>>,
}

impl ContextBuilder {
    /// Start from a configuration
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            clock: None,
            rate_limit_store: None,
            cache_store: None,
            transport: None,
        }
    }

    /// Use a specific time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use a specific rate-limit store
    pub fn with_rate_limit_store(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limit_store = Some(store);
        self
    }

    /// Use a specific cache store
    pub fn with_cache_store(mut self, store: Arc<dyn CacheProvider>) -> Self {
        self.cache_store = Some(store);
        self
    }

    /// Use a specific upstream transport
    pub fn with_transport(mut self, transport: Arc<dyn UpstreamTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Wire every service
    pub async fn build(self) -> Result<TollgateContext> {
        let config = self.config;
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let (rate_limit_store, cache_store) = match (self.rate_limit_store, self.cache_store) {
            (Some(limits), Some(cache)) => (limits, cache),
            (limits, cache) => {
                let (default_limits, default_cache) = create_stores(&config, &clock)?;
                (
                    limits.unwrap_or(default_limits),
                    cache.unwrap_or(default_cache),
                )
            }
        };
        info!(
            rate_limit_store = rate_limit_store.provider_name(),
            cache_store = cache_store.provider_name(),
            "Resolved shared stores"
        );

        let (recorder, prometheus) = create_recorder(&config)?;

        let rate_limiter = {
            let mut policies = RateLimitPolicies::new(config.rate_limit.default_policy);
            for (name, provider) in &config.providers {
                policies.insert(name.as_str(), provider.rate_limit_policy());
            }
            let limiter = RateLimiter::new(Arc::clone(&rate_limit_store), policies, Arc::clone(&clock));
            if config.stub_mode || !config.rate_limit.enabled {
                limiter.disabled()
            } else {
                limiter
            }
        };

        let default_ttl = Duration::from_secs(config.cache.default_ttl_secs);
        let cache = {
            let mut policy = CacheTtlPolicy::new(default_ttl);
            for (name, provider) in &config.providers {
                if let Some(ttl) = provider.cache_ttl_secs {
                    policy.insert(name.as_str(), Duration::from_secs(ttl));
                }
            }
            let cache = ResponseCache::new(Arc::clone(&cache_store), policy);
            if config.stub_mode || !config.cache.enabled {
                cache.disabled()
            } else {
                cache
            }
        };

        let mut breakers = CircuitBreakerRegistry::new(
            config.circuit_breaker.settings(),
            Arc::clone(&clock),
            Arc::clone(&recorder),
        );
        for (name, provider) in &config.providers {
            if let Some(overrides) = &provider.circuit_breaker {
                breakers = breakers.with_override(name.as_str(), overrides.settings());
            }
        }

        let mut catalog = ProviderCatalog::new();
        for (name, provider) in &config.providers {
            catalog.register(Arc::new(ConfiguredProvider::from_config(
                name,
                provider,
                default_ttl,
            )));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => create_transport(&config)?,
        };

        info!(
            providers = catalog.len(),
            stub_mode = config.stub_mode,
            cache_enabled = cache.is_enabled(),
            rate_limit_enabled = rate_limiter.is_enabled(),
            "Gateway services created"
        );

        let rate_limiter = Arc::new(rate_limiter);
        let cache = Arc::new(cache);
        let breakers = Arc::new(breakers);

        let gateway = GatewayServiceImpl::new(
            catalog,
            rate_limiter.clone(),
            breakers.clone(),
            cache.clone(),
            transport,
            Arc::clone(&recorder),
        )
        .with_timeout(config.upstream.timeout());

        let health = HealthRegistry::new();
        health
            .register_checker("cache_store", CacheStoreHealthChecker::new(cache_store))
            .await;
        health
            .register_checker(
                "rate_limit_store",
                RateLimitStoreHealthChecker::new(rate_limit_store),
            )
            .await;

        Ok(TollgateContext {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            rate_limiter,
            breakers,
            cache,
            recorder,
            prometheus,
            health,
        })
    }
}

/// Wire the gateway from configuration alone
pub async fn init_app(config: AppConfig) -> Result<TollgateContext> {
    info!("Initializing gateway context");
    ContextBuilder::new(config).build().await
}

fn create_stores(
    config: &AppConfig,
    clock: &Arc<dyn Clock>,
) -> Result<(Arc<dyn RateLimitStore>, Arc<dyn CacheProvider>)> {
    let timeout = config.store.timeout();
    let limits: Arc<dyn RateLimitStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryRateLimitStore::with_clock(Arc::clone(clock))),
        StoreBackend::Redis => Arc::new(RedisRateLimitStore::new(&config.store.redis_url, timeout)?),
    };
    // A disabled cache never opens a store connection
    let cache: Arc<dyn CacheProvider> = match config.store.backend {
        _ if !config.cache.enabled => Arc::new(NullCacheProvider::new()),
        StoreBackend::Memory => Arc::new(MokaCacheProvider::with_clock(
            config.cache.max_entries,
            Arc::clone(clock),
        )),
        StoreBackend::Redis => Arc::new(RedisCacheProvider::new(&config.store.redis_url, timeout)?),
    };
    Ok((limits, cache))
}

fn create_recorder(
    config: &AppConfig,
) -> Result<(Arc<dyn UsageRecorder>, Option<Arc<PrometheusUsageRecorder>>)> {
    if config.metrics.enabled {
        let prometheus = Arc::new(PrometheusUsageRecorder::new(&config.metrics)?);
        let recorder: Arc<dyn UsageRecorder> = prometheus.clone();
        Ok((recorder, Some(prometheus)))
    } else {
        Ok((Arc::new(NullUsageRecorder::new()), None))
    }
}

fn create_transport(config: &AppConfig) -> Result<Arc<dyn UpstreamTransport>> {
    if config.stub_mode {
        info!("Stub mode: upstream calls are simulated");
        return Ok(Arc::new(StubTransport::new()));
    }
    let client_config = HttpClientConfig {
        timeout: config.upstream.timeout(),
        user_agent: config.upstream.user_agent.clone(),
        ..HttpClientConfig::default()
    };
    Ok(Arc::new(ReqwestTransport::new(client_config)?))
}
