//! Usage Recorder Port
//!
//! Process-wide usage and cost accounting. Recording never fails: an
//! implementation that hits an internal fault logs it and carries on.

use crate::value_objects::{CircuitState, RateLimitScope};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One registered collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorSummary {
    /// Fully-qualified metric name
    pub name: String,
    /// Help text
    pub help: String,
    /// Number of label combinations observed so far
    pub series: usize,
}

/// Usage/cost recorder interface
pub trait UsageRecorder: Send + Sync + std::fmt::Debug {
    /// Record one completed upstream call
    fn record_call(&self, provider: &str, endpoint: &str, status: &str, latency: Duration);

    /// Add the estimated cost of a call
    fn record_cost(&self, provider: &str, endpoint: &str, cost: f64);

    /// Count a cache hit
    fn record_cache_hit(&self, provider: &str);

    /// Count a cache miss
    fn record_cache_miss(&self, provider: &str);

    /// Count a rate-limit denial
    fn record_rate_limited(&self, provider: &str, scope: RateLimitScope);

    /// Publish the current breaker state
    fn record_circuit_state(&self, provider: &str, state: CircuitState);

    /// Registered collectors, for diagnostics
    fn summary(&self) -> Vec<CollectorSummary>;
}
