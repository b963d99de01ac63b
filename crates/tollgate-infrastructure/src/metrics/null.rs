use std::time::Duration;
use tollgate_domain::ports::{CollectorSummary, UsageRecorder};
use tollgate_domain::value_objects::{CircuitState, RateLimitScope};

/// Recorder that drops every observation
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUsageRecorder;

impl NullUsageRecorder {
    /// Create a null recorder
    pub fn new() -> Self {
        Self
    }
}

impl UsageRecorder for NullUsageRecorder {
    fn record_call(&self, _provider: &str, _endpoint: &str, _status: &str, _latency: Duration) {}

    fn record_cost(&self, _provider: &str, _endpoint: &str, _cost: f64) {}

    fn record_cache_hit(&self, _provider: &str) {}

    fn record_cache_miss(&self, _provider: &str) {}

    fn record_rate_limited(&self, _provider: &str, _scope: RateLimitScope) {}

    fn record_circuit_state(&self, _provider: &str, _state: CircuitState) {}

    fn summary(&self) -> Vec<CollectorSummary> {
        Vec::new()
    }
}
