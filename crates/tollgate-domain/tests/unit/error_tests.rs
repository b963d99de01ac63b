//! Unit tests for the caller-visible error taxonomy

use std::time::Duration;
use tollgate_domain::error::{Error, GatewayError};
use tollgate_domain::value_objects::{RateLimitPolicy, RateLimitScope, RateLimitUsage};

fn usage() -> RateLimitUsage {
    RateLimitUsage::from_policy("alpha", &RateLimitPolicy::new(2, 5, 1), 2, None)
}

#[test]
fn test_rate_limit_error_carries_retry_after() {
    let err = GatewayError::RateLimitExceeded {
        provider: "alpha".to_string(),
        scope: RateLimitScope::Daily,
        retry_after: Duration::from_secs(120),
        usage: usage(),
    };

    assert_eq!(err.retry_after(), Some(Duration::from_secs(120)));
    assert_eq!(err.provider(), Some("alpha"));
    assert_eq!(err.kind(), "rate_limited");
    assert!(err.to_string().contains("daily quota"));
    assert!(err.to_string().contains("120s"));
}

#[test]
fn test_circuit_open_is_distinct_from_upstream_error() {
    let open = GatewayError::CircuitOpen {
        provider: "beta".to_string(),
        retry_after: Duration::from_secs(60),
    };
    let upstream = GatewayError::upstream("beta", Some(503), "unavailable");

    assert_eq!(open.kind(), "circuit_open");
    assert_eq!(upstream.kind(), "upstream_error");
    assert!(open.to_string().starts_with("Service unavailable"));
    assert_eq!(upstream.retry_after(), None);
}

#[test]
fn test_upstream_error_display_includes_status() {
    let err = GatewayError::upstream("beta", Some(502), "bad gateway");
    assert_eq!(
        err.to_string(),
        "Upstream error from beta (status 502): bad gateway"
    );

    let transport = GatewayError::upstream("beta", None, "connection refused");
    assert_eq!(
        transport.to_string(),
        "Upstream error from beta: connection refused"
    );
}

#[test]
fn test_retryability() {
    assert!(GatewayError::upstream("a", None, "timeout").is_retryable());
    assert!(GatewayError::upstream("a", Some(500), "boom").is_retryable());
    assert!(GatewayError::upstream("a", Some(429), "slow down").is_retryable());
    assert!(!GatewayError::upstream("a", Some(404), "missing").is_retryable());
    assert!(!GatewayError::configuration("unknown provider").is_retryable());
}

#[test]
fn test_internal_error_constructors() {
    let err = Error::configuration("missing base_url");
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(err.to_string(), "Configuration error: missing base_url");

    let err = Error::infrastructure_with_source(
        "redis unreachable",
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
    );
    assert!(std::error::Error::source(&err).is_some());
}
