//! Metrics configuration types

use crate::constants::{LATENCY_BUCKETS, METRICS_NAMESPACE};
use serde::{Deserialize, Serialize};

/// Usage/cost recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Record to a prometheus registry; when false a no-op recorder is used
    pub enabled: bool,

    /// Prefix of every metric name
    pub namespace: String,

    /// Latency histogram buckets, in seconds
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: METRICS_NAMESPACE.to_string(),
            latency_buckets: LATENCY_BUCKETS.to_vec(),
        }
    }
}
