//! Unit tests for circuit breaker value objects

use std::time::Duration;
use tollgate_domain::value_objects::{CircuitBreakerSettings, CircuitState, CircuitStateInfo};

#[test]
fn test_default_settings() {
    let settings = CircuitBreakerSettings::default();
    assert_eq!(settings.failure_threshold, 5);
    assert_eq!(settings.recovery_timeout, Duration::from_secs(60));
    assert_eq!(settings.success_threshold, 3);
    assert_eq!(settings.half_open_max_calls, 1);
}

#[test]
fn test_gauge_encoding() {
    assert_eq!(CircuitState::Closed.gauge_value(), 0.0);
    assert_eq!(CircuitState::HalfOpen.gauge_value(), 1.0);
    assert_eq!(CircuitState::Open.gauge_value(), 2.0);
}

#[test]
fn test_state_serializes_snake_case() {
    let json = serde_json::to_string(&CircuitState::HalfOpen).expect("serialize");
    assert_eq!(json, "\"half_open\"");
    assert_eq!(CircuitState::HalfOpen.to_string(), "half_open");
}

#[test]
fn test_settings_from_toml_style_json() {
    let settings: CircuitBreakerSettings = serde_json::from_str(
        r#"{"failure_threshold":2,"recovery_timeout":10,"success_threshold":1,"half_open_max_calls":1}"#,
    )
    .expect("deserialize");
    assert_eq!(settings.failure_threshold, 2);
    assert_eq!(settings.recovery_timeout, Duration::from_secs(10));
}

#[test]
fn test_state_info_round_trip() {
    let info = CircuitStateInfo {
        provider: "beta".to_string(),
        state: CircuitState::Open,
        failure_count: 0,
        success_count: 0,
        can_execute: false,
        retry_after: Some(Duration::from_secs(42)),
    };
    let json = serde_json::to_string(&info).expect("serialize");
    let back: CircuitStateInfo = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, info);
}
