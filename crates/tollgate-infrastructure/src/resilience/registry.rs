//! Arena of per-provider circuit breakers
//!
//! Each provider's breaker has its own lock, so unrelated providers never
//! contend. Breakers are created on first use.

use super::circuit_breaker::CircuitBreaker;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tollgate_domain::ports::{CircuitBreakerRegistryInterface, Clock, UsageRecorder};
use tollgate_domain::value_objects::{CircuitBreakerSettings, CircuitStateInfo};

/// Per-provider circuit breaker registry
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    defaults: CircuitBreakerSettings,
    overrides: HashMap<String, CircuitBreakerSettings>,
    clock: Arc<dyn Clock>,
    recorder: Arc<dyn UsageRecorder>,
}

impl CircuitBreakerRegistry {
    /// Create a registry applying `defaults` to every provider
    pub fn new(
        defaults: CircuitBreakerSettings,
        clock: Arc<dyn Clock>,
        recorder: Arc<dyn UsageRecorder>,
    ) -> Self {
        Self {
            breakers: DashMap::new(),
            defaults,
            overrides: HashMap::new(),
            clock,
            recorder,
        }
    }

    /// Use different thresholds for one provider
    pub fn with_override(
        mut self,
        provider: impl Into<String>,
        settings: CircuitBreakerSettings,
    ) -> Self {
        self.overrides.insert(provider.into(), settings);
        self
    }

    /// The breaker for a provider, created closed on first use
    pub fn breaker(&self, provider: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(provider) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .breakers
            .entry(provider.to_string())
            .or_insert_with(|| {
                let settings = self
                    .overrides
                    .get(provider)
                    .copied()
                    .unwrap_or(self.defaults);
                Arc::new(CircuitBreaker::new(
                    provider,
                    settings,
                    Arc::clone(&self.clock),
                    Arc::clone(&self.recorder),
                ))
            });
        Arc::clone(entry.value())
    }

    /// Force a provider's breaker open (test/ops use)
    pub fn force_open(&self, provider: &str) {
        self.breaker(provider).force_open();
    }

    /// Force a provider's breaker half-open (test/ops use)
    pub fn force_half_open(&self, provider: &str) {
        self.breaker(provider).force_half_open();
    }

    /// Number of breakers created so far
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    /// Whether no breaker has been created yet
    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

impl CircuitBreakerRegistryInterface for CircuitBreakerRegistry {
    fn can_execute(&self, provider: &str) -> bool {
        self.breaker(provider).can_execute()
    }

    fn record_success(&self, provider: &str) {
        self.breaker(provider).record_success();
    }

    fn record_failure(&self, provider: &str) {
        self.breaker(provider).record_failure();
    }

    fn state_info(&self, provider: &str) -> CircuitStateInfo {
        self.breaker(provider).state_info()
    }

    fn retry_after(&self, provider: &str) -> Option<Duration> {
        self.breaker(provider).retry_after()
    }

    fn reset(&self, provider: &str) {
        self.breaker(provider).reset();
    }

    fn snapshot(&self) -> Vec<CircuitStateInfo> {
        // Collect first so no shard lock is held while a breaker is locked
        let breakers: Vec<Arc<CircuitBreaker>> = self
            .breakers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut infos: Vec<CircuitStateInfo> = breakers.iter().map(|b| b.state_info()).collect();
        infos.sort_by(|a, b| a.provider.cmp(&b.provider));
        infos
    }
}
