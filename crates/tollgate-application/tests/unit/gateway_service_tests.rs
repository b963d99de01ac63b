//! Request orchestration tests
//!
//! The resilience services are replaced by small fakes so each step of the
//! sequence can be observed in isolation.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tollgate_application::{GatewayServiceImpl, GatewayServiceInterface, ProviderCatalog};
use tollgate_domain::error::{Error, GatewayError, Result};
use tollgate_domain::ports::{
    CircuitBreakerRegistryInterface, CollectorSummary, ProviderProfile, RateLimiterInterface,
    ResponseCacheInterface, UsageRecorder,
};
use tollgate_domain::value_objects::{
    Admission, CacheKey, CacheLookup, CacheStats, CircuitState, CircuitStateInfo, HttpMethod,
    RateLimitDenial, RateLimitPolicy, RateLimitScope, RateLimitUsage, RequestContext,
    RequestParams, UpstreamResponse,
};
use tollgate_providers::http::{StubReply, StubTransport};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Profile {
    name: &'static str,
    ttl: Duration,
}

impl ProviderProfile for Profile {
    fn name(&self) -> &str {
        self.name
    }
    fn base_url(&self) -> &str {
        "https://api.test"
    }
    fn headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("x-api-key".to_string(), "secret".to_string())])
    }
    fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::conservative()
    }
    fn cache_ttl(&self) -> Duration {
        self.ttl
    }
    fn cost(&self, operation: &str, _response: &UpstreamResponse) -> f64 {
        if operation == "GET:/search" { 0.5 } else { 0.1 }
    }
}

#[derive(Default)]
struct Limiter {
    deny: Mutex<Option<RateLimitScope>>,
    degraded: AtomicBool,
    checks: AtomicUsize,
}

#[async_trait]
impl RateLimiterInterface for Limiter {
    async fn check(&self, provider: &str, _operation: &str) -> Admission {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.degraded.load(Ordering::SeqCst) {
            return Admission::Degraded {
                reason: "store unreachable".to_string(),
            };
        }
        match *self.deny.lock().expect("lock") {
            Some(scope) => Admission::Denied(RateLimitDenial {
                scope,
                retry_after: Duration::from_secs(7),
                usage: RateLimitUsage::from_policy(provider, &RateLimitPolicy::new(2, 1, 1), 2, None),
            }),
            None => Admission::Admitted,
        }
    }
    async fn get_usage(&self, provider: &str) -> Result<RateLimitUsage> {
        Ok(RateLimitUsage::from_policy(provider, &RateLimitPolicy::conservative(), 0, None))
    }
    async fn reset(&self, _provider: &str) -> Result<()> {
        Ok(())
    }
    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct Breakers {
    open: AtomicBool,
    successes: AtomicUsize,
    failures: AtomicUsize,
    resets: AtomicUsize,
}

impl CircuitBreakerRegistryInterface for Breakers {
    fn can_execute(&self, _provider: &str) -> bool {
        !self.open.load(Ordering::SeqCst)
    }
    fn record_success(&self, _provider: &str) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }
    fn record_failure(&self, _provider: &str) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
    fn state_info(&self, provider: &str) -> CircuitStateInfo {
        let open = self.open.load(Ordering::SeqCst);
        CircuitStateInfo {
            provider: provider.to_string(),
            state: if open { CircuitState::Open } else { CircuitState::Closed },
            failure_count: 0,
            success_count: 0,
            can_execute: !open,
            retry_after: None,
        }
    }
    fn retry_after(&self, _provider: &str) -> Option<Duration> {
        self.open
            .load(Ordering::SeqCst)
            .then_some(Duration::from_secs(42))
    }
    fn reset(&self, _provider: &str) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
    }
    fn snapshot(&self) -> Vec<CircuitStateInfo> {
        Vec::new()
    }
}

#[derive(Default)]
struct Cache {
    entries: Mutex<HashMap<CacheKey, UpstreamResponse>>,
    writes: AtomicUsize,
}

#[async_trait]
impl ResponseCacheInterface for Cache {
    fn key(
        &self,
        provider: &str,
        method: HttpMethod,
        endpoint: &str,
        params: &RequestParams,
        body: Option<&[u8]>,
    ) -> CacheKey {
        CacheKey::derive(provider, method, endpoint, params, body)
    }
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        match self.entries.lock().expect("lock").get(key) {
            Some(response) => {
                let mut response = response.clone();
                response.cached = true;
                CacheLookup::Hit(response)
            }
            None => CacheLookup::Miss,
        }
    }
    async fn set(&self, _provider: &str, key: &CacheKey, response: &UpstreamResponse, _ttl: Option<Duration>) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .expect("lock")
            .insert(key.clone(), response.clone());
        true
    }
    async fn delete(&self, key: &CacheKey) -> bool {
        self.entries.lock().expect("lock").remove(key).is_some()
    }
    async fn clear(&self, _provider: &str) -> u64 {
        let mut entries = self.entries.lock().expect("lock");
        let removed = entries.len() as u64;
        entries.clear();
        removed
    }
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
    fn push(&self, event: String) {
        self.events.lock().expect("lock").push(event);
    }
}

impl UsageRecorder for Recorder {
    fn record_call(&self, provider: &str, endpoint: &str, status: &str, _latency: Duration) {
        self.push(format!("call:{provider}:{endpoint}:{status}"));
    }
    fn record_cost(&self, provider: &str, _endpoint: &str, cost: f64) {
        self.push(format!("cost:{provider}:{cost}"));
    }
    fn record_cache_hit(&self, provider: &str) {
        self.push(format!("hit:{provider}"));
    }
    fn record_cache_miss(&self, provider: &str) {
        self.push(format!("miss:{provider}"));
    }
    fn record_rate_limited(&self, provider: &str, scope: RateLimitScope) {
        self.push(format!("limited:{provider}:{scope}"));
    }
    fn record_circuit_state(&self, provider: &str, state: CircuitState) {
        self.push(format!("circuit:{provider}:{state}"));
    }
    fn summary(&self) -> Vec<CollectorSummary> {
        Vec::new()
    }
}

struct Harness {
    service: GatewayServiceImpl,
    limiter: Arc<Limiter>,
    breakers: Arc<Breakers>,
    cache: Arc<Cache>,
    transport: Arc<StubTransport>,
    recorder: Arc<Recorder>,
}

fn harness() -> Harness {
    let limiter = Arc::new(Limiter::default());
    let breakers = Arc::new(Breakers::default());
    let cache = Arc::new(Cache::default());
    let transport = Arc::new(StubTransport::scripted());
    let recorder = Arc::new(Recorder::default());
    let catalog = ProviderCatalog::new()
        .with_provider(Arc::new(Profile {
            name: "alpha",
            ttl: Duration::from_secs(60),
        }))
        .with_provider(Arc::new(Profile {
            name: "uncached",
            ttl: Duration::ZERO,
        }));

    let service = GatewayServiceImpl::new(
        catalog,
        limiter.clone(),
        breakers.clone(),
        cache.clone(),
        transport.clone(),
        recorder.clone(),
    )
    .with_timeout(Duration::from_secs(5));

    Harness {
        service,
        limiter,
        breakers,
        cache,
        transport,
        recorder,
    }
}

fn search(provider: &str, q: &str) -> RequestContext {
    let params = json!({ "q": q }).as_object().cloned().expect("object");
    RequestContext::new(provider, HttpMethod::Get, "/search", params, None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_success_records_breaker_cache_cost_and_call() {
    let h = harness();
    h.transport
        .respond(UpstreamResponse::ok(json!({"results": [1, 2]})));

    let response = h.service.execute(search("alpha", "rust")).await.expect("success");

    assert_eq!(response.body, json!({"results": [1, 2]}));
    assert!(!response.cached);
    assert_eq!(h.breakers.successes.load(Ordering::SeqCst), 1);
    assert_eq!(h.cache.writes.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.recorder.events(),
        vec![
            "miss:alpha".to_string(),
            "cost:alpha:0.5".to_string(),
            "call:alpha:/search:200".to_string(),
        ]
    );

    let sent = h.transport.requests();
    assert_eq!(sent[0].url, "https://api.test/search");
    assert_eq!(sent[0].headers.get("x-api-key").map(String::as_str), Some("secret"));
}

#[tokio::test]
async fn test_cache_hit_skips_quota_circuit_and_network() {
    let h = harness();
    h.transport.respond(UpstreamResponse::ok(json!({"n": 1})));
    h.service.execute(search("alpha", "rust")).await.expect("first");

    h.breakers.open.store(true, Ordering::SeqCst);
    let cached = h.service.execute(search("alpha", "rust")).await.expect("cached");

    assert!(cached.cached);
    assert_eq!(cached.body, json!({"n": 1}));
    assert_eq!(h.transport.call_count(), 1);
    assert_eq!(h.limiter.checks.load(Ordering::SeqCst), 1);
    assert_eq!(h.recorder.events().last().map(String::as_str), Some("hit:alpha"));
}

#[tokio::test]
async fn test_rate_limit_denial_never_reaches_upstream() {
    let h = harness();
    *h.limiter.deny.lock().expect("lock") = Some(RateLimitScope::Daily);

    let err = h
        .service
        .execute(search("alpha", "rust"))
        .await
        .expect_err("denied");

    match err {
        GatewayError::RateLimitExceeded {
            provider,
            scope,
            retry_after,
            usage,
        } => {
            assert_eq!(provider, "alpha");
            assert_eq!(scope, RateLimitScope::Daily);
            assert_eq!(retry_after, Duration::from_secs(7));
            assert_eq!(usage.daily_remaining, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.transport.call_count(), 0);
    assert_eq!(h.breakers.failures.load(Ordering::SeqCst), 0);
    assert!(h.recorder.events().contains(&"limited:alpha:daily".to_string()));
    assert!(!h.recorder.events().iter().any(|e| e.starts_with("call:")));
}

#[tokio::test]
async fn test_open_circuit_fails_fast() {
    let h = harness();
    h.breakers.open.store(true, Ordering::SeqCst);

    let err = h
        .service
        .execute(search("alpha", "rust"))
        .await
        .expect_err("circuit open");

    assert_eq!(
        err,
        GatewayError::CircuitOpen {
            provider: "alpha".to_string(),
            retry_after: Duration::from_secs(42),
        }
    );
    assert!(err.is_retryable());
    assert_eq!(h.transport.call_count(), 0);
}

#[tokio::test]
async fn test_failure_status_is_upstream_error_and_not_cached() {
    let h = harness();
    h.transport.respond(UpstreamResponse::new(
        503,
        json!({"error": {"message": "maintenance"}}),
    ));

    let err = h
        .service
        .execute(search("alpha", "rust"))
        .await
        .expect_err("upstream failure");

    assert_eq!(
        err,
        GatewayError::upstream("alpha", Some(503), "maintenance")
    );
    assert_eq!(h.breakers.failures.load(Ordering::SeqCst), 1);
    assert_eq!(h.breakers.successes.load(Ordering::SeqCst), 0);
    assert_eq!(h.cache.writes.load(Ordering::SeqCst), 0);
    assert!(h.recorder.events().contains(&"call:alpha:/search:503".to_string()));
}

#[tokio::test]
async fn test_transport_error_counts_as_failure() {
    let h = harness();
    h.transport
        .push(StubReply::Fail("connection refused".to_string()));

    let err = h
        .service
        .execute(search("alpha", "rust"))
        .await
        .expect_err("transport failure");

    assert!(matches!(err, GatewayError::Upstream { status: None, .. }));
    assert_eq!(h.breakers.failures.load(Ordering::SeqCst), 1);
    assert!(h.recorder.events().contains(&"call:alpha:/search:transport_error".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_counts_as_failure() {
    let h = harness();
    h.transport.push(StubReply::Delay(
        Duration::from_secs(30),
        UpstreamResponse::ok(json!({})),
    ));

    let err = h
        .service
        .execute(search("alpha", "slow"))
        .await
        .expect_err("timeout");

    match err {
        GatewayError::Upstream { status, message, .. } => {
            assert_eq!(status, None);
            assert!(message.contains("timed out"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.breakers.failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_degraded_rate_limiter_admits() {
    let h = harness();
    h.limiter.degraded.store(true, Ordering::SeqCst);

    h.service
        .execute(search("alpha", "rust"))
        .await
        .expect("fail-open");
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_provider_is_configuration_error() {
    let h = harness();
    let err = h
        .service
        .execute(search("nope", "rust"))
        .await
        .expect_err("unknown provider");

    assert!(matches!(err, GatewayError::Configuration { .. }));
    assert!(!err.is_retryable());
    assert_eq!(h.limiter.checks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_uncacheable_provider_bypasses_cache() {
    let h = harness();
    h.service.execute(search("uncached", "a")).await.expect("first");
    h.service.execute(search("uncached", "a")).await.expect("second");

    assert_eq!(h.transport.call_count(), 2);
    assert_eq!(h.cache.writes.load(Ordering::SeqCst), 0);
    assert!(!h.recorder.events().iter().any(|e| e.starts_with("miss:")));
}

#[tokio::test]
async fn test_reset_provider_clears_cache_and_breaker() {
    let h = harness();
    h.service.execute(search("alpha", "rust")).await.expect("cached");

    let summary = h.service.reset_provider("alpha").await.expect("reset");

    assert_eq!(summary.cache_entries_removed, 1);
    assert_eq!(h.breakers.resets.load(Ordering::SeqCst), 1);
    assert!(matches!(
        h.service.reset_provider("nope").await,
        Err(Error::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn test_health_check_reports_every_provider() {
    let h = harness();
    h.breakers.open.store(true, Ordering::SeqCst);

    let reports = h.service.health_check().await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].provider, "alpha");
    assert_eq!(reports[0].circuit_state, CircuitState::Open);
    assert!(reports[0].rate_limit.is_some());
}
