//! Health checks
//!
//! Shared-store reachability checks plus the per-provider view assembled by
//! the gateway (breaker state and quota usage).

use crate::constants::HEALTH_CHECK_KEY;
use crate::logging::log_health_check;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tollgate_domain::error::Result;
use tollgate_domain::value_objects::{ProviderHealthReport, ProviderHealthStatus};

/// Gateway-level status, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    /// Serving, but a store or provider is impaired
    Degraded,
    Down,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == Self::Up
    }
}

/// Outcome of checking one store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

impl HealthCheck {
    /// Turn a store result into a check; a failed call degrades
    fn from_result<T>(name: String, started: Instant, outcome: Result<T>) -> Self {
        let (status, error) = match outcome {
            Ok(_) => (HealthStatus::Up, None),
            Err(e) => (HealthStatus::Degraded, Some(e.to_string())),
        };
        Self {
            name,
            status,
            timestamp: chrono::Utc::now(),
            response_time_ms: millis(started.elapsed()),
            error,
        }
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Report printed by `tollgate health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Worst status across store checks and providers
    pub status: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub response_time_ms: u64,
    /// Store checks keyed by registration name
    pub checks: BTreeMap<String, HealthCheck>,
    pub providers: Vec<ProviderHealthReport>,
    pub version: String,
}

impl HealthResponse {
    fn from_checks(checks: BTreeMap<String, HealthCheck>, elapsed: Duration) -> Self {
        let status = checks
            .values()
            .map(|check| check.status)
            .max()
            .unwrap_or(HealthStatus::Up);
        Self {
            status,
            timestamp: chrono::Utc::now(),
            response_time_ms: millis(elapsed),
            checks,
            providers: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Attach provider reports
    ///
    /// Any provider short of healthy degrades the gateway, which keeps serving
    /// the others.
    pub fn with_providers(mut self, providers: Vec<ProviderHealthReport>) -> Self {
        if providers
            .iter()
            .any(|p| p.status != ProviderHealthStatus::Healthy)
        {
            self.status = self.status.max(HealthStatus::Degraded);
        }
        self.providers = providers;
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// A named reachability check
#[async_trait::async_trait]
pub trait HealthChecker: Send + Sync {
    async fn check_health(&self) -> HealthCheck;
}

/// Store checks, run in name order
#[derive(Clone, Default)]
pub struct HealthRegistry {
    checkers: Arc<RwLock<BTreeMap<String, Arc<dyn HealthChecker>>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a checker, replacing any registered under the same name
    pub async fn register_checker<C>(&self, name: impl Into<String>, checker: C)
    where
        C: HealthChecker + 'static,
    {
        let mut checkers = self.checkers.write().await;
        checkers.insert(name.into(), Arc::new(checker));
    }

    pub async fn unregister_checker(&self, name: &str) {
        self.checkers.write().await.remove(name);
    }

    /// Run every checker and fold the results
    ///
    /// The lock is released before checking so a slow store never blocks
    /// registration.
    pub async fn perform_health_checks(&self) -> HealthResponse {
        let started = Instant::now();
        let snapshot: Vec<_> = {
            let checkers = self.checkers.read().await;
            checkers
                .iter()
                .map(|(name, checker)| (name.clone(), Arc::clone(checker)))
                .collect()
        };

        let mut checks = BTreeMap::new();
        for (name, checker) in snapshot {
            let check = checker.check_health().await;
            log_health_check(&name, check.status.is_healthy(), check.error.as_deref());
            checks.insert(name, check);
        }
        HealthResponse::from_checks(checks, started.elapsed())
    }

    pub async fn list_checks(&self) -> Vec<String> {
        self.checkers.read().await.keys().cloned().collect()
    }
}

/// Checks for the shared stores
///
/// An unreachable store degrades rather than downs the gateway: the cache
/// falls back to misses and the rate limiter fails open.
pub mod checkers {
    use super::{HealthCheck, HealthChecker, HEALTH_CHECK_KEY};
    use std::sync::Arc;
    use std::time::Instant;
    use tollgate_domain::ports::{CacheProvider, RateLimitStore};

    pub struct CacheStoreHealthChecker {
        store: Arc<dyn CacheProvider>,
    }

    impl CacheStoreHealthChecker {
        pub fn new(store: Arc<dyn CacheProvider>) -> Self {
            Self { store }
        }
    }

    #[async_trait::async_trait]
    impl HealthChecker for CacheStoreHealthChecker {
        async fn check_health(&self) -> HealthCheck {
            let started = Instant::now();
            let outcome = self.store.exists(HEALTH_CHECK_KEY).await;
            HealthCheck::from_result(
                format!("cache:{}", self.store.provider_name()),
                started,
                outcome,
            )
        }
    }

    pub struct RateLimitStoreHealthChecker {
        store: Arc<dyn RateLimitStore>,
    }

    impl RateLimitStoreHealthChecker {
        pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
            Self { store }
        }
    }

    #[async_trait::async_trait]
    impl HealthChecker for RateLimitStoreHealthChecker {
        async fn check_health(&self) -> HealthCheck {
            let started = Instant::now();
            let outcome = self.store.daily_usage(HEALTH_CHECK_KEY).await;
            HealthCheck::from_result(
                format!("rate_limit:{}", self.store.provider_name()),
                started,
                outcome,
            )
        }
    }
}
