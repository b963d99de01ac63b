//! Unit tests for provider health derivation

use tollgate_domain::value_objects::{
    CircuitState, ProviderHealthReport, ProviderHealthStatus, RateLimitPolicy, RateLimitUsage,
};

#[test]
fn test_closed_with_quota_is_healthy() {
    let usage = RateLimitUsage::from_policy("alpha", &RateLimitPolicy::new(10, 2, 1), 3, None);
    let report = ProviderHealthReport::new("alpha", CircuitState::Closed, Some(usage));
    assert_eq!(report.status, ProviderHealthStatus::Healthy);
}

#[test]
fn test_half_open_is_degraded() {
    let report = ProviderHealthReport::new("alpha", CircuitState::HalfOpen, None);
    assert_eq!(report.status, ProviderHealthStatus::Degraded);
}

#[test]
fn test_report_serializes_for_cli_output() {
    let report = ProviderHealthReport::new("alpha", CircuitState::Open, None);
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["circuit_state"], "open");
    assert!(json["rate_limit"].is_null());
}
