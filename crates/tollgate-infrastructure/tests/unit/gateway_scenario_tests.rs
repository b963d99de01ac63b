//! End-to-end gateway scenarios through the composition root
//!
//! Services are wired from configuration with in-memory stores, a manual
//! clock and a scripted transport.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tollgate_application::GatewayServiceInterface;
use tollgate_domain::error::{Error, GatewayError};
use tollgate_domain::ports::ResponseCacheInterface;
use tollgate_domain::value_objects::{
    CircuitState, HttpMethod, ProviderHealthStatus, RateLimitScope, RequestContext,
    UpstreamResponse,
};
use tollgate_infrastructure::config::{AppConfig, CircuitBreakerConfig, ConfigBuilder, ProviderConfig};
use tollgate_infrastructure::di::{ContextBuilder, TollgateContext};
use tollgate_infrastructure::health::HealthStatus;
use tollgate_providers::ManualClock;
use tollgate_providers::cache::FailingCacheProvider;
use tollgate_providers::http::StubTransport;
use tollgate_providers::rate_limit::FailingRateLimitStore;

fn config(stub_mode: bool) -> AppConfig {
    ConfigBuilder::empty()
        .with_stub_mode(stub_mode)
        .with_provider(
            "alpha",
            ProviderConfig::new("https://alpha.test")
                .with_limits(2, 10, 1)
                .with_cost_per_call(0.1),
        )
        .with_provider(
            "beta",
            ProviderConfig::new("https://beta.test").with_circuit_breaker(CircuitBreakerConfig {
                failure_threshold: 2,
                recovery_timeout_secs: 30,
                ..CircuitBreakerConfig::default()
            }),
        )
        .with_provider(
            "gamma",
            ProviderConfig::new("https://gamma.test").with_cache_ttl_secs(300),
        )
        .build()
        .expect("valid config")
}

async fn context(
    stub_mode: bool,
) -> (TollgateContext, Arc<StubTransport>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let transport = Arc::new(StubTransport::scripted());
    let context = ContextBuilder::new(config(stub_mode))
        .with_clock(clock.clone())
        .with_transport(transport.clone())
        .build()
        .await
        .expect("context");
    (context, transport, clock)
}

fn get(provider: &str, endpoint: &str, params: serde_json::Value) -> RequestContext {
    RequestContext::new(
        provider,
        HttpMethod::Get,
        endpoint,
        params.as_object().cloned().unwrap_or_default(),
        None,
    )
}

#[tokio::test]
async fn test_daily_limit_denies_third_call() {
    let (context, transport, _clock) = context(false).await;
    let gateway = context.gateway();

    gateway.execute(get("alpha", "/q", json!({"n": 1}))).await.expect("first");
    gateway.execute(get("alpha", "/q", json!({"n": 2}))).await.expect("second");
    let err = gateway
        .execute(get("alpha", "/q", json!({"n": 3})))
        .await
        .expect_err("third is over quota");

    match err {
        GatewayError::RateLimitExceeded { scope, usage, .. } => {
            assert_eq!(scope, RateLimitScope::Daily);
            assert_eq!(usage.daily_used, 2);
            assert_eq!(usage.daily_limit, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.call_count(), 2);

    let prometheus = context.prometheus().expect("metrics enabled");
    assert!((prometheus.cost("alpha", "/q") - 0.2).abs() < 1e-9);
    assert_eq!(prometheus.calls("alpha", "/q", "200"), 2.0);
}

#[tokio::test]
async fn test_consecutive_failures_open_circuit() {
    let (context, transport, clock) = context(false).await;
    let gateway = context.gateway();
    transport
        .respond(UpstreamResponse::new(500, json!({"error": "boom"})))
        .respond(UpstreamResponse::new(502, json!({"error": "bad gateway"})));

    for n in 0..2 {
        let err = gateway
            .execute(get("beta", "/v1/items", json!({ "n": n })))
            .await
            .expect_err("upstream failure");
        assert!(matches!(err, GatewayError::Upstream { status: Some(_), .. }));
    }

    let err = gateway
        .execute(get("beta", "/v1/items", json!({"n": 3})))
        .await
        .expect_err("circuit open");
    assert!(matches!(err, GatewayError::CircuitOpen { .. }));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    assert_eq!(transport.call_count(), 2, "open circuit never reaches the network");

    clock.advance(Duration::from_secs(30));
    gateway
        .execute(get("beta", "/v1/items", json!({"n": 4})))
        .await
        .expect("trial call succeeds");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_identical_requests_hit_network_once() {
    let (context, transport, _clock) = context(false).await;
    let gateway = context.gateway();
    transport.respond(UpstreamResponse::ok(json!({"value": 42})));

    let first = gateway
        .execute(get("gamma", "/x", json!({"a": 1, "b": 2})))
        .await
        .expect("first");
    let second = gateway
        .execute(get("gamma", "/x", json!({"b": 2, "a": 1})))
        .await
        .expect("second");

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.body, json!({"value": 42}));
    assert_eq!(transport.call_count(), 1);

    let prometheus = context.prometheus().expect("metrics enabled");
    assert_eq!(prometheus.cache_counts("gamma"), (1.0, 1.0));
    assert_eq!(context.cache().clear("gamma").await, 1, "exactly one entry written");
}

#[tokio::test]
async fn test_head_reply_is_not_served_to_get() {
    let (context, transport, _clock) = context(false).await;
    let gateway = context.gateway();
    transport
        .respond(UpstreamResponse::ok(serde_json::Value::Null))
        .respond(UpstreamResponse::ok(json!({"data": 42})));

    let head = RequestContext::new(
        "gamma",
        HttpMethod::Head,
        "/x",
        json!({"a": 1}).as_object().cloned().unwrap_or_default(),
        None,
    );
    let head = gateway.execute(head).await.expect("head");
    let fetched = gateway
        .execute(get("gamma", "/x", json!({"a": 1})))
        .await
        .expect("get");

    assert!(!head.cached);
    assert!(!fetched.cached);
    assert_eq!(fetched.body, json!({"data": 42}));
    assert_eq!(transport.call_count(), 2);

    let again = gateway
        .execute(get("gamma", "/x", json!({"a": 1})))
        .await
        .expect("cached get");
    assert!(again.cached);
    assert_eq!(again.body, json!({"data": 42}));
}

#[tokio::test]
async fn test_cached_entry_expires_with_provider_ttl() {
    let (context, transport, clock) = context(false).await;
    let gateway = context.gateway();

    gateway.execute(get("gamma", "/x", json!({}))).await.expect("first");
    clock.advance(Duration::from_secs(300));
    let again = gateway.execute(get("gamma", "/x", json!({}))).await.expect("second");

    assert!(!again.cached);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_stub_mode_bypasses_cache_and_quota() {
    let (context, transport, _clock) = context(true).await;
    let gateway = context.gateway();

    for _ in 0..4 {
        let response = gateway
            .execute(get("alpha", "/q", json!({"same": true})))
            .await
            .expect("stub call");
        assert!(!response.cached);
    }

    assert_eq!(transport.call_count(), 4);
    let prometheus = context.prometheus().expect("metrics enabled");
    assert_eq!(prometheus.cache_counts("alpha"), (0.0, 0.0));
    let reports = gateway.health_check().await;
    assert!(reports.iter().all(|r| r.rate_limit.is_none()));
}

#[tokio::test]
async fn test_unreachable_stores_fail_open() {
    let transport = Arc::new(StubTransport::scripted());
    let context = ContextBuilder::new(config(false))
        .with_clock(Arc::new(ManualClock::new()))
        .with_rate_limit_store(Arc::new(FailingRateLimitStore::new()))
        .with_cache_store(Arc::new(FailingCacheProvider::new()))
        .with_transport(transport.clone())
        .build()
        .await
        .expect("context");
    let gateway = context.gateway();

    for _ in 0..3 {
        gateway
            .execute(get("alpha", "/q", json!({"n": 1})))
            .await
            .expect("admitted without the store");
    }
    assert_eq!(transport.call_count(), 3);

    let report = context.health_report().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(report.providers.iter().all(|p| p.rate_limit.is_none()));
}

#[tokio::test]
async fn test_reset_provider_restores_quota_and_circuit() {
    let (context, transport, _clock) = context(false).await;
    let gateway = context.gateway();

    gateway.execute(get("alpha", "/q", json!({"n": 1}))).await.expect("first");
    gateway.execute(get("alpha", "/q", json!({"n": 2}))).await.expect("second");
    context.breakers().force_open("alpha");

    let summary = gateway.reset_provider("alpha").await.expect("reset");
    assert_eq!(summary.cache_entries_removed, 2);

    assert_eq!(gateway.usage("alpha").await.expect("usage").daily_used, 0);
    gateway.execute(get("alpha", "/q", json!({"n": 3}))).await.expect("admitted again");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_health_reflects_circuit_and_quota() {
    let (context, _transport, _clock) = context(false).await;
    let gateway = context.gateway();

    gateway.execute(get("alpha", "/q", json!({"n": 1}))).await.expect("first");
    gateway.execute(get("alpha", "/q", json!({"n": 2}))).await.expect("second");
    context.breakers().force_open("beta");

    let report = context.health_report().await;
    let by_name = |name: &str| {
        report
            .providers
            .iter()
            .find(|p| p.provider == name)
            .expect("provider report")
            .clone()
    };

    assert_eq!(report.providers.len(), 3);
    assert_eq!(by_name("beta").circuit_state, CircuitState::Open);
    assert_ne!(by_name("beta").status, ProviderHealthStatus::Healthy);
    assert_ne!(by_name("alpha").status, ProviderHealthStatus::Healthy);
    assert_eq!(by_name("gamma").status, ProviderHealthStatus::Healthy);
    assert_eq!(report.status, HealthStatus::Degraded);
}

#[tokio::test]
async fn test_unknown_provider_operations() {
    let (context, transport, _clock) = context(false).await;
    let gateway = context.gateway();

    let err = gateway
        .execute(get("delta", "/q", json!({})))
        .await
        .expect_err("unknown provider");
    assert!(matches!(err, GatewayError::Configuration { .. }));
    assert!(matches!(
        gateway.usage("delta").await,
        Err(Error::InvalidArgument { .. })
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_disabled_cache_uses_null_store() {
    let mut config = config(false);
    config.cache.enabled = false;
    let transport = Arc::new(StubTransport::scripted());
    let context = ContextBuilder::new(config)
        .with_transport(transport.clone())
        .build()
        .await
        .expect("context");
    let gateway = context.gateway();

    for _ in 0..2 {
        let response = gateway
            .execute(get("gamma", "/x", json!({"a": 1})))
            .await
            .expect("call");
        assert!(!response.cached);
    }

    assert_eq!(context.cache().store_name(), "null");
    assert_eq!(transport.call_count(), 2);
    let report = context.health_report().await;
    assert!(report.checks.values().all(|check| check.error.is_none()));
}
