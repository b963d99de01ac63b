//! Prometheus-backed usage recorder

use crate::config::MetricsConfig;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::HashMap;
use std::time::Duration;
use tollgate_domain::error::{Error, Result};
use tollgate_domain::ports::{CollectorSummary, UsageRecorder};
use tollgate_domain::value_objects::{CircuitState, RateLimitScope};
use tracing::warn;

const CALLS_TOTAL: &str = "api_calls_total";
const LATENCY_SECONDS: &str = "api_latency_seconds";
const COST_TOTAL: &str = "api_cost_total";
const CACHE_HITS_TOTAL: &str = "cache_hits_total";
const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
const RATE_LIMIT_EXCEEDED_TOTAL: &str = "rate_limit_exceeded_total";
const CIRCUIT_BREAKER_STATE: &str = "circuit_breaker_state";

/// Usage/cost recorder over an owned prometheus [`Registry`]
///
/// Recording never fails; a label mismatch is logged and dropped.
pub struct PrometheusUsageRecorder {
    registry: Registry,
    namespace: String,
    help: Vec<(String, String)>,
    calls_total: CounterVec,
    latency: HistogramVec,
    cost_total: CounterVec,
    cache_hits: CounterVec,
    cache_misses: CounterVec,
    rate_limit_exceeded: CounterVec,
    circuit_state: GaugeVec,
}

impl PrometheusUsageRecorder {
    /// Build and register every collector
    pub fn new(config: &MetricsConfig) -> Result<Self> {
        let registry = Registry::new();
        let namespace = config.namespace.clone();
        let mut help = Vec::new();

        let calls_total = CounterVec::new(
            opts(&namespace, CALLS_TOTAL, "Upstream calls by outcome", &mut help),
            &["provider", "endpoint", "status"],
        )
        .map_err(registration_error)?;
        registry
            .register(Box::new(calls_total.clone()))
            .map_err(registration_error)?;

        let latency = HistogramVec::new(
            HistogramOpts::new(LATENCY_SECONDS, "Upstream call latency in seconds")
                .namespace(namespace.clone())
                .buckets(config.latency_buckets.clone()),
            &["provider", "endpoint"],
        )
        .map_err(registration_error)?;
        help.push((
            qualified(&namespace, LATENCY_SECONDS),
            "Upstream call latency in seconds".to_string(),
        ));
        registry
            .register(Box::new(latency.clone()))
            .map_err(registration_error)?;

        let cost_total = CounterVec::new(
            opts(&namespace, COST_TOTAL, "Estimated upstream spend", &mut help),
            &["provider", "endpoint"],
        )
        .map_err(registration_error)?;
        registry
            .register(Box::new(cost_total.clone()))
            .map_err(registration_error)?;

        let cache_hits = CounterVec::new(
            opts(&namespace, CACHE_HITS_TOTAL, "Requests served from cache", &mut help),
            &["provider"],
        )
        .map_err(registration_error)?;
        registry
            .register(Box::new(cache_hits.clone()))
            .map_err(registration_error)?;

        let cache_misses = CounterVec::new(
            opts(&namespace, CACHE_MISSES_TOTAL, "Requests not found in cache", &mut help),
            &["provider"],
        )
        .map_err(registration_error)?;
        registry
            .register(Box::new(cache_misses.clone()))
            .map_err(registration_error)?;

        let rate_limit_exceeded = CounterVec::new(
            opts(
                &namespace,
                RATE_LIMIT_EXCEEDED_TOTAL,
                "Requests denied by a quota",
                &mut help,
            ),
            &["provider", "scope"],
        )
        .map_err(registration_error)?;
        registry
            .register(Box::new(rate_limit_exceeded.clone()))
            .map_err(registration_error)?;

        let circuit_state = GaugeVec::new(
            opts(
                &namespace,
                CIRCUIT_BREAKER_STATE,
                "Circuit state (0 closed, 1 half-open, 2 open)",
                &mut help,
            ),
            &["provider"],
        )
        .map_err(registration_error)?;
        registry
            .register(Box::new(circuit_state.clone()))
            .map_err(registration_error)?;

        Ok(Self {
            registry,
            namespace,
            help,
            calls_total,
            latency,
            cost_total,
            cache_hits,
            cache_misses,
            rate_limit_exceeded,
            circuit_state,
        })
    }

    /// The underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus text exposition of every collector
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| Error::metrics(format!("Failed to encode metrics: {e}")))?;
        String::from_utf8(buffer).map_err(|e| Error::metrics(format!("Metrics are not UTF-8: {e}")))
    }

    /// Drop every recorded series (test use)
    pub fn reset(&self) {
        self.calls_total.reset();
        self.latency.reset();
        self.cost_total.reset();
        self.cache_hits.reset();
        self.cache_misses.reset();
        self.rate_limit_exceeded.reset();
        self.circuit_state.reset();
    }

    /// Accumulated cost for one provider/endpoint pair
    pub fn cost(&self, provider: &str, endpoint: &str) -> f64 {
        self.cost_total
            .get_metric_with_label_values(&[provider, endpoint])
            .map_or(0.0, |c| c.get())
    }

    /// Calls recorded for one provider/endpoint/status triple
    pub fn calls(&self, provider: &str, endpoint: &str, status: &str) -> f64 {
        self.calls_total
            .get_metric_with_label_values(&[provider, endpoint, status])
            .map_or(0.0, |c| c.get())
    }

    /// Cache hits and misses recorded for one provider
    pub fn cache_counts(&self, provider: &str) -> (f64, f64) {
        let hits = self
            .cache_hits
            .get_metric_with_label_values(&[provider])
            .map_or(0.0, |c| c.get());
        let misses = self
            .cache_misses
            .get_metric_with_label_values(&[provider])
            .map_or(0.0, |c| c.get());
        (hits, misses)
    }

    /// Published breaker gauge for one provider
    pub fn circuit_gauge(&self, provider: &str) -> f64 {
        self.circuit_state
            .get_metric_with_label_values(&[provider])
            .map_or(0.0, |g| g.get())
    }
}

fn opts(namespace: &str, name: &str, help: &str, registered: &mut Vec<(String, String)>) -> Opts {
    registered.push((qualified(namespace, name), help.to_string()));
    Opts::new(name, help).namespace(namespace.to_string())
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

fn registration_error(err: prometheus::Error) -> Error {
    Error::metrics(format!("Failed to register collector: {err}"))
}

fn swallow(metric: &str, err: &prometheus::Error) {
    warn!(metric, error = %err, "Failed to record metric");
}

impl UsageRecorder for PrometheusUsageRecorder {
    fn record_call(&self, provider: &str, endpoint: &str, status: &str, latency: Duration) {
        match self
            .calls_total
            .get_metric_with_label_values(&[provider, endpoint, status])
        {
            Ok(counter) => counter.inc(),
            Err(e) => swallow(CALLS_TOTAL, &e),
        }
        match self
            .latency
            .get_metric_with_label_values(&[provider, endpoint])
        {
            Ok(histogram) => histogram.observe(latency.as_secs_f64()),
            Err(e) => swallow(LATENCY_SECONDS, &e),
        }
    }

    fn record_cost(&self, provider: &str, endpoint: &str, cost: f64) {
        // Counters panic on negative increments
        if !cost.is_finite() || cost <= 0.0 {
            return;
        }
        match self
            .cost_total
            .get_metric_with_label_values(&[provider, endpoint])
        {
            Ok(counter) => counter.inc_by(cost),
            Err(e) => swallow(COST_TOTAL, &e),
        }
    }

    fn record_cache_hit(&self, provider: &str) {
        match self.cache_hits.get_metric_with_label_values(&[provider]) {
            Ok(counter) => counter.inc(),
            Err(e) => swallow(CACHE_HITS_TOTAL, &e),
        }
    }

    fn record_cache_miss(&self, provider: &str) {
        match self.cache_misses.get_metric_with_label_values(&[provider]) {
            Ok(counter) => counter.inc(),
            Err(e) => swallow(CACHE_MISSES_TOTAL, &e),
        }
    }

    fn record_rate_limited(&self, provider: &str, scope: RateLimitScope) {
        match self
            .rate_limit_exceeded
            .get_metric_with_label_values(&[provider, scope.as_str()])
        {
            Ok(counter) => counter.inc(),
            Err(e) => swallow(RATE_LIMIT_EXCEEDED_TOTAL, &e),
        }
    }

    fn record_circuit_state(&self, provider: &str, state: CircuitState) {
        match self.circuit_state.get_metric_with_label_values(&[provider]) {
            Ok(gauge) => gauge.set(state.gauge_value()),
            Err(e) => swallow(CIRCUIT_BREAKER_STATE, &e),
        }
    }

    fn summary(&self) -> Vec<CollectorSummary> {
        let series: HashMap<String, usize> = self
            .registry
            .gather()
            .iter()
            .map(|family| (family.name().to_string(), family.get_metric().len()))
            .collect();

        self.help
            .iter()
            .map(|(name, help)| CollectorSummary {
                name: name.clone(),
                help: help.clone(),
                series: series.get(name).copied().unwrap_or(0),
            })
            .collect()
    }
}

impl std::fmt::Debug for PrometheusUsageRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusUsageRecorder")
            .field("namespace", &self.namespace)
            .field("collectors", &self.help.len())
            .finish_non_exhaustive()
    }
}
