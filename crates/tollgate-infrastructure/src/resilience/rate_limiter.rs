//! Distributed rate limiter
//!
//! Two quotas guard every provider: a daily counter shared by all of its
//! operations and a sliding burst window per operation. Both live in a
//! [`RateLimitStore`] shared across processes, and each check is a single
//! atomic store step.
//!
//! The limiter never fails a call because the store is unreachable. A store
//! fault yields [`Admission::Degraded`], is logged, and the call proceeds.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tollgate_domain::constants::{DAILY_WINDOW_SECS, RATE_LIMIT_BURST_PREFIX};
use tollgate_domain::error::Result;
use tollgate_domain::ports::{Clock, RateLimitStore, RateLimiterInterface};
use tollgate_domain::value_objects::{
    Admission, RateLimitDenial, RateLimitPolicy, RateLimitScope, RateLimitUsage, StoreDecision,
    burst_key, daily_key,
};
use tracing::{debug, warn};

/// Static per-provider policy table with a fallback for unlisted providers
#[derive(Debug, Clone, Default)]
pub struct RateLimitPolicies {
    policies: HashMap<String, RateLimitPolicy>,
    fallback: RateLimitPolicy,
}

impl RateLimitPolicies {
    /// Create a table with the given fallback policy
    pub fn new(fallback: RateLimitPolicy) -> Self {
        Self {
            policies: HashMap::new(),
            fallback,
        }
    }

    /// Add or replace a provider's policy
    pub fn with_policy(mut self, provider: impl Into<String>, policy: RateLimitPolicy) -> Self {
        self.policies.insert(provider.into(), policy);
        self
    }

    /// Insert a provider's policy
    pub fn insert(&mut self, provider: impl Into<String>, policy: RateLimitPolicy) {
        self.policies.insert(provider.into(), policy);
    }

    /// Policy for a provider, falling back to the conservative default
    pub fn policy_for(&self, provider: &str) -> RateLimitPolicy {
        self.policies
            .get(provider)
            .copied()
            .unwrap_or(self.fallback)
    }
}

/// Rate limiter over a shared counter store
#[derive(Debug)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policies: RateLimitPolicies,
    clock: Arc<dyn Clock>,
    enabled: bool,
}

impl RateLimiter {
    /// Create an enforcing rate limiter
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        policies: RateLimitPolicies,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policies,
            clock,
            enabled: true,
        }
    }

    /// Turn enforcement off (stub mode); every check admits
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Policy applied to a provider
    pub fn policy_for(&self, provider: &str) -> RateLimitPolicy {
        self.policies.policy_for(provider)
    }

    /// Name of the backing store implementation
    pub fn store_name(&self) -> &str {
        self.store.provider_name()
    }

    async fn enforce(&self, provider: &str, operation: &str) -> Result<Admission> {
        let policy = self.policies.policy_for(provider);

        let burst = self
            .store
            .check_burst(
                &burst_key(provider, operation),
                policy.burst_limit,
                policy.window(),
                self.clock.unix_millis(),
            )
            .await?;
        if !burst.admitted {
            return Ok(self.deny(provider, &policy, RateLimitScope::Burst, burst).await);
        }

        let daily = self
            .store
            .check_daily(
                &daily_key(provider),
                policy.daily_limit,
                Duration::from_secs(DAILY_WINDOW_SECS),
            )
            .await?;
        if !daily.admitted {
            return Ok(self.deny(provider, &policy, RateLimitScope::Daily, daily).await);
        }

        debug!(
            provider,
            operation,
            daily_count = daily.count,
            burst_count = burst.count,
            "Request admitted"
        );
        Ok(Admission::Admitted)
    }

    async fn deny(
        &self,
        provider: &str,
        policy: &RateLimitPolicy,
        scope: RateLimitScope,
        decision: StoreDecision,
    ) -> Admission {
        let usage = match scope {
            RateLimitScope::Daily => RateLimitUsage::from_policy(
                provider,
                policy,
                decision.count,
                Some(decision.retry_after),
            ),
            // Best effort: the denial stands even if usage cannot be read
            RateLimitScope::Burst => match self.store.daily_usage(&daily_key(provider)).await {
                Ok(snapshot) => RateLimitUsage::from_policy(
                    provider,
                    policy,
                    snapshot.count,
                    snapshot.resets_in,
                ),
                Err(_) => RateLimitUsage::from_policy(provider, policy, 0, None),
            },
        };

        debug!(
            provider,
            scope = %scope,
            retry_after_ms = decision.retry_after.as_millis() as u64,
            "Request denied by quota"
        );

        Admission::Denied(RateLimitDenial {
            scope,
            retry_after: decision.retry_after,
            usage,
        })
    }
}

#[async_trait]
impl RateLimiterInterface for RateLimiter {
    async fn check(&self, provider: &str, operation: &str) -> Admission {
        if !self.enabled {
            return Admission::Admitted;
        }

        match self.enforce(provider, operation).await {
            Ok(admission) => admission,
            Err(e) => {
                warn!(
                    provider,
                    operation,
                    store = self.store.provider_name(),
                    error = %e,
                    "Rate limit store unavailable, admitting request"
                );
                Admission::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn get_usage(&self, provider: &str) -> Result<RateLimitUsage> {
        let policy = self.policies.policy_for(provider);
        let snapshot = self.store.daily_usage(&daily_key(provider)).await?;
        Ok(RateLimitUsage::from_policy(
            provider,
            &policy,
            snapshot.count,
            snapshot.resets_in,
        ))
    }

    async fn reset(&self, provider: &str) -> Result<()> {
        let daily = self.store.delete(&[daily_key(provider)]).await?;
        let burst = self
            .store
            .delete_prefix(&format!("{RATE_LIMIT_BURST_PREFIX}:{provider}:"))
            .await?;
        debug!(provider, daily, burst, "Rate limit counters reset");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
