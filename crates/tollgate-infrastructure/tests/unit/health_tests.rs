//! Health registry and checker tests

use std::sync::Arc;
use tollgate_infrastructure::health::checkers::{
    CacheStoreHealthChecker, RateLimitStoreHealthChecker,
};
use tollgate_infrastructure::health::{HealthRegistry, HealthStatus};
use tollgate_providers::cache::{FailingCacheProvider, MokaCacheProvider};
use tollgate_providers::rate_limit::{FailingRateLimitStore, MemoryRateLimitStore};

#[tokio::test]
async fn test_reachable_stores_are_up() {
    let registry = HealthRegistry::new();
    registry
        .register_checker(
            "cache_store",
            CacheStoreHealthChecker::new(Arc::new(MokaCacheProvider::new())),
        )
        .await;
    registry
        .register_checker(
            "rate_limit_store",
            RateLimitStoreHealthChecker::new(Arc::new(MemoryRateLimitStore::new())),
        )
        .await;

    let response = registry.perform_health_checks().await;

    assert_eq!(response.status, HealthStatus::Up);
    assert!(response.is_healthy());
    assert_eq!(response.checks.len(), 2);
    assert_eq!(
        registry.list_checks().await,
        vec!["cache_store".to_string(), "rate_limit_store".to_string()]
    );
}

#[tokio::test]
async fn test_unreachable_store_degrades() {
    let registry = HealthRegistry::new();
    registry
        .register_checker(
            "cache_store",
            CacheStoreHealthChecker::new(Arc::new(FailingCacheProvider::new())),
        )
        .await;
    registry
        .register_checker(
            "rate_limit_store",
            RateLimitStoreHealthChecker::new(Arc::new(FailingRateLimitStore::new())),
        )
        .await;

    let response = registry.perform_health_checks().await;

    assert_eq!(response.status, HealthStatus::Degraded);
    assert!(response.checks.values().all(|c| c.error.is_some()));
}

#[tokio::test]
async fn test_unregistered_checker_is_not_run() {
    let registry = HealthRegistry::new();
    registry
        .register_checker(
            "cache_store",
            CacheStoreHealthChecker::new(Arc::new(FailingCacheProvider::new())),
        )
        .await;
    registry.unregister_checker("cache_store").await;

    let response = registry.perform_health_checks().await;
    assert!(response.checks.is_empty());
    assert_eq!(response.status, HealthStatus::Up);
}
