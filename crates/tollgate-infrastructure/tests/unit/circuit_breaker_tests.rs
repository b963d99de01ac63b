//! Circuit breaker and registry tests

use std::sync::Arc;
use std::time::Duration;
use tollgate_domain::ports::CircuitBreakerRegistryInterface;
use tollgate_domain::value_objects::{CircuitBreakerSettings, CircuitState};
use tollgate_infrastructure::config::MetricsConfig;
use tollgate_infrastructure::metrics::{NullUsageRecorder, PrometheusUsageRecorder};
use tollgate_infrastructure::resilience::{CircuitBreaker, CircuitBreakerRegistry};
use tollgate_providers::ManualClock;

fn settings() -> CircuitBreakerSettings {
    CircuitBreakerSettings::default()
        .with_failure_threshold(3)
        .with_recovery_timeout(Duration::from_secs(60))
        .with_success_threshold(2)
}

fn breaker(clock: &Arc<ManualClock>) -> CircuitBreaker {
    CircuitBreaker::new("alpha", settings(), clock.clone(), Arc::new(NullUsageRecorder))
}

#[test]
fn test_opens_after_consecutive_failures() {
    let clock = Arc::new(ManualClock::new());
    let cb = breaker(&clock);

    cb.record_failure();
    cb.record_failure();
    assert_eq!(cb.state(), CircuitState::Closed);
    assert!(cb.can_execute());

    cb.record_failure();
    assert_eq!(cb.state(), CircuitState::Open);
    assert!(!cb.can_execute());
    assert_eq!(cb.retry_after(), Some(Duration::from_secs(60)));
}

#[test]
fn test_success_resets_failure_streak() {
    let clock = Arc::new(ManualClock::new());
    let cb = breaker(&clock);

    cb.record_failure();
    cb.record_failure();
    cb.record_success();
    cb.record_failure();
    cb.record_failure();

    assert_eq!(cb.state(), CircuitState::Closed);
    assert_eq!(cb.state_info().failure_count, 2);
}

#[test]
fn test_recovery_timeout_admits_single_trial_call() {
    let clock = Arc::new(ManualClock::new());
    let cb = breaker(&clock);
    for _ in 0..3 {
        cb.record_failure();
    }

    clock.advance(Duration::from_secs(59));
    assert!(!cb.can_execute());

    clock.advance(Duration::from_secs(1));
    assert!(cb.can_execute(), "first caller after the timeout is the trial call");
    assert_eq!(cb.state(), CircuitState::HalfOpen);
    assert!(!cb.can_execute(), "second caller waits for the trial call");
}

#[test]
fn test_half_open_closes_after_success_threshold() {
    let clock = Arc::new(ManualClock::new());
    let cb = breaker(&clock);
    cb.force_open();
    clock.advance(Duration::from_secs(60));

    assert!(cb.can_execute());
    cb.record_success();
    assert_eq!(cb.state(), CircuitState::HalfOpen);

    assert!(cb.can_execute());
    cb.record_success();
    assert_eq!(cb.state(), CircuitState::Closed);

    let info = cb.state_info();
    assert_eq!(info.failure_count, 0);
    assert_eq!(info.success_count, 0);
    assert!(info.can_execute);
}

#[test]
fn test_half_open_failure_reopens_with_fresh_timeout() {
    let clock = Arc::new(ManualClock::new());
    let cb = breaker(&clock);
    cb.force_open();
    clock.advance(Duration::from_secs(60));

    assert!(cb.can_execute());
    cb.record_failure();

    assert_eq!(cb.state(), CircuitState::Open);
    assert_eq!(cb.retry_after(), Some(Duration::from_secs(60)));
}

#[test]
fn test_state_info_does_not_transition() {
    let clock = Arc::new(ManualClock::new());
    let cb = breaker(&clock);
    cb.force_open();
    clock.advance(Duration::from_secs(61));

    let info = cb.state_info();
    assert_eq!(info.state, CircuitState::Open);
    assert!(info.can_execute);
    assert_eq!(cb.state(), CircuitState::Open);
}

#[test]
fn test_registry_isolates_providers() {
    let clock = Arc::new(ManualClock::new());
    let registry = CircuitBreakerRegistry::new(settings(), clock, Arc::new(NullUsageRecorder));

    for _ in 0..3 {
        registry.record_failure("alpha");
    }

    assert!(!registry.can_execute("alpha"));
    assert!(registry.can_execute("beta"));
    assert_eq!(registry.len(), 2);

    let snapshot = registry.snapshot();
    let providers: Vec<_> = snapshot.iter().map(|i| i.provider.as_str()).collect();
    assert_eq!(providers, vec!["alpha", "beta"]);
}

#[test]
fn test_registry_applies_overrides() {
    let clock = Arc::new(ManualClock::new());
    let registry = CircuitBreakerRegistry::new(settings(), clock, Arc::new(NullUsageRecorder))
        .with_override("fragile", settings().with_failure_threshold(1));

    registry.record_failure("fragile");
    registry.record_failure("alpha");

    assert_eq!(registry.state_info("fragile").state, CircuitState::Open);
    assert_eq!(registry.state_info("alpha").state, CircuitState::Closed);
}

#[test]
fn test_registry_reset_closes_breaker() {
    let clock = Arc::new(ManualClock::new());
    let registry = CircuitBreakerRegistry::new(settings(), clock, Arc::new(NullUsageRecorder));
    registry.force_open("alpha");
    assert!(registry.retry_after("alpha").is_some());

    registry.reset("alpha");

    assert!(registry.can_execute("alpha"));
    assert_eq!(registry.retry_after("alpha"), None);
}

#[test]
fn test_transitions_publish_state_gauge() {
    let clock = Arc::new(ManualClock::new());
    let recorder = Arc::new(
        PrometheusUsageRecorder::new(&MetricsConfig::default()).expect("recorder"),
    );
    let registry = CircuitBreakerRegistry::new(settings(), clock.clone(), recorder.clone());

    assert!(registry.can_execute("alpha"));
    assert_eq!(recorder.circuit_gauge("alpha"), 0.0);

    registry.force_open("alpha");
    assert_eq!(recorder.circuit_gauge("alpha"), 2.0);

    clock.advance(Duration::from_secs(60));
    assert!(registry.can_execute("alpha"));
    assert_eq!(recorder.circuit_gauge("alpha"), 1.0);
}
