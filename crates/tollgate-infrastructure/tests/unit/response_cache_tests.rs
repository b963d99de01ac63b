//! Response cache tests over the Moka store

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tollgate_domain::ports::ResponseCacheInterface;
use tollgate_domain::value_objects::{
    CacheKey, CacheLookup, HttpMethod, RequestParams, UpstreamResponse,
};
use tollgate_infrastructure::cache::{CacheTtlPolicy, ResponseCache};
use tollgate_providers::ManualClock;
use tollgate_providers::cache::{FailingCacheProvider, MokaCacheProvider};

fn params(value: serde_json::Value) -> RequestParams {
    value.as_object().cloned().unwrap_or_default()
}

fn cache(clock: &Arc<ManualClock>) -> ResponseCache {
    ResponseCache::new(
        Arc::new(MokaCacheProvider::with_clock(1_000, clock.clone())),
        CacheTtlPolicy::new(Duration::from_secs(3600)).with_ttl("alpha", Duration::from_secs(60)),
    )
}

fn key(cache: &ResponseCache, q: &str) -> CacheKey {
    cache.key("alpha", HttpMethod::Get, "/search", &params(json!({"q": q})), None)
}

#[tokio::test]
async fn test_stored_response_is_returned_as_cached() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock);
    let key = key(&cache, "rust");

    assert_eq!(cache.get(&key).await, CacheLookup::Miss);
    assert!(cache.set("alpha", &key, &UpstreamResponse::ok(json!({"n": 1})), None).await);

    let hit = cache.get(&key).await.into_hit().expect("hit");
    assert!(hit.cached);
    assert_eq!(hit.status, 200);
    assert_eq!(hit.body, json!({"n": 1}));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_entries_expire_after_provider_ttl() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock);
    let key = key(&cache, "rust");
    cache.set("alpha", &key, &UpstreamResponse::ok(json!(1)), None).await;

    clock.advance(Duration::from_secs(59));
    assert!(cache.get(&key).await.into_hit().is_some());

    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get(&key).await, CacheLookup::Miss);
}

#[tokio::test]
async fn test_explicit_ttl_overrides_policy() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock);
    let key = key(&cache, "rust");
    cache
        .set("alpha", &key, &UpstreamResponse::ok(json!(1)), Some(Duration::from_secs(5)))
        .await;

    clock.advance(Duration::from_secs(5));
    assert_eq!(cache.get(&key).await, CacheLookup::Miss);
}

#[tokio::test]
async fn test_zero_ttl_is_not_stored() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock);
    let key = key(&cache, "rust");

    assert!(
        !cache
            .set("alpha", &key, &UpstreamResponse::ok(json!(1)), Some(Duration::ZERO))
            .await
    );
    assert_eq!(cache.get(&key).await, CacheLookup::Miss);
}

#[tokio::test]
async fn test_clear_removes_only_that_provider() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock);
    let alpha_a = key(&cache, "a");
    let alpha_b = key(&cache, "b");
    let beta = cache.key("beta", HttpMethod::Get, "/search", &params(json!({"q": "a"})), None);
    let response = UpstreamResponse::ok(json!({}));

    cache.set("alpha", &alpha_a, &response, None).await;
    cache.set("alpha", &alpha_b, &response, None).await;
    cache.set("beta", &beta, &response, None).await;

    assert_eq!(cache.clear("alpha").await, 2);
    assert_eq!(cache.get(&alpha_a).await, CacheLookup::Miss);
    assert!(cache.get(&beta).await.into_hit().is_some());
}

#[tokio::test]
async fn test_delete_reports_presence() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock);
    let key = key(&cache, "rust");
    cache.set("alpha", &key, &UpstreamResponse::ok(json!(1)), None).await;

    assert!(cache.delete(&key).await);
    assert!(!cache.delete(&key).await);
}

#[tokio::test]
async fn test_unreachable_store_degrades_to_miss() {
    let cache = ResponseCache::new(
        Arc::new(FailingCacheProvider::new()),
        CacheTtlPolicy::default(),
    );
    let key = key(&cache, "rust");

    assert!(matches!(cache.get(&key).await, CacheLookup::Degraded { .. }));
    assert!(!cache.set("alpha", &key, &UpstreamResponse::ok(json!(1)), None).await);
    assert_eq!(cache.clear("alpha").await, 0);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert!(stats.errors >= 2);
}

#[tokio::test]
async fn test_disabled_cache_never_hits() {
    let clock = Arc::new(ManualClock::new());
    let cache = cache(&clock).disabled();
    let key = key(&cache, "rust");

    assert!(!cache.set("alpha", &key, &UpstreamResponse::ok(json!(1)), None).await);
    assert_eq!(cache.get(&key).await, CacheLookup::Miss);
    assert!(!cache.is_enabled());
}
