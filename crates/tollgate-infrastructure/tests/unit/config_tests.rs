//! Configuration loading tests
//!
//! Environment tests use a prefix unique to each test so they never observe
//! each other's variables.

use std::env;
use std::io::Write;
use tempfile::NamedTempFile;
use tollgate_domain::error::Error;
use tollgate_domain::value_objects::HttpMethod;
use tollgate_infrastructure::config::{
    AppConfig, CircuitBreakerConfig, ConfigBuilder, ConfigLoader, ProviderConfig, StoreBackend,
};

fn set_env(key: &str, value: &str) {
    // SAFETY: keys are unique to the calling test
    unsafe {
        env::set_var(key, value);
    }
}

fn remove_env(key: &str) {
    // SAFETY: keys are unique to the calling test
    unsafe {
        env::remove_var(key);
    }
}

fn write_toml(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[test]
fn test_defaults_carry_builtin_providers() {
    let config = AppConfig::default();

    assert!(!config.stub_mode);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    for name in ["openai", "pagespeed", "serpapi", "stripe", "twilio"] {
        assert!(config.providers.contains_key(name), "missing {name}");
    }
    assert_eq!(config.providers["twilio"].cache_ttl_secs, Some(0));
    assert_eq!(
        config.providers["openai"].cacheable_methods,
        vec![HttpMethod::Post]
    );
}

#[test]
fn test_file_overrides_merge_into_builtin_table() {
    let file = write_toml(
        r#"
stub_mode = true

[store]
backend = "redis"
redis_url = "redis://cache.internal:6380"

[providers.serpapi]
daily_limit = 42

[providers.alpha]
base_url = "https://alpha.test"
daily_limit = 2
burst_limit = 10
window_seconds = 1
cost_per_call = 0.25
"#,
    );

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env_prefix("TGCFG_FILE")
        .load()
        .expect("load");

    assert!(config.stub_mode);
    assert_eq!(config.store.backend, StoreBackend::Redis);
    assert_eq!(config.store.redis_url, "redis://cache.internal:6380");

    let serpapi = &config.providers["serpapi"];
    assert_eq!(serpapi.daily_limit, 42);
    assert_eq!(serpapi.base_url, AppConfig::default().providers["serpapi"].base_url);

    let alpha = &config.providers["alpha"];
    assert_eq!(alpha.rate_limit_policy().daily_limit, 2);
    assert!((alpha.cost_per_call - 0.25).abs() < f64::EPSILON);
    assert_eq!(alpha.cacheable_methods, vec![HttpMethod::Get, HttpMethod::Head]);
}

#[test]
fn test_environment_overrides_file() {
    let file = write_toml("[cache]\ndefault_ttl_secs = 600\n");
    set_env("TGCFG_ENV__CACHE__DEFAULT_TTL_SECS", "120");
    set_env("TGCFG_ENV__CIRCUIT_BREAKER__FAILURE_THRESHOLD", "2");

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env_prefix("TGCFG_ENV")
        .load();

    remove_env("TGCFG_ENV__CACHE__DEFAULT_TTL_SECS");
    remove_env("TGCFG_ENV__CIRCUIT_BREAKER__FAILURE_THRESHOLD");

    let config = config.expect("load");
    assert_eq!(config.cache.default_ttl_secs, 120);
    assert_eq!(config.circuit_breaker.failure_threshold, 2);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let config = ConfigLoader::new()
        .with_config_path("/nonexistent/tollgate.toml")
        .with_env_prefix("TGCFG_MISSING")
        .load()
        .expect("load");

    assert_eq!(config.providers.len(), AppConfig::default().providers.len());
}

#[test]
fn test_invalid_provider_is_rejected() {
    let file = write_toml(
        r#"
[providers."bad:name"]
base_url = "https://bad.test"
"#,
    );

    let result = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env_prefix("TGCFG_INVALID")
        .load();

    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_builder_validates() {
    let zero_limits = ConfigBuilder::empty()
        .with_provider("alpha", ProviderConfig::new("https://alpha.test").with_limits(0, 1, 1))
        .build();
    assert!(zero_limits.is_err());

    let no_scheme = ConfigBuilder::empty()
        .with_provider("alpha", ProviderConfig::new("alpha.test"))
        .build();
    assert!(no_scheme.is_err());

    let breaker = ConfigBuilder::empty()
        .with_provider(
            "alpha",
            ProviderConfig::new("https://alpha.test").with_circuit_breaker(CircuitBreakerConfig {
                failure_threshold: 0,
                ..CircuitBreakerConfig::default()
            }),
        )
        .build();
    assert!(breaker.is_err());

    let config = ConfigBuilder::empty()
        .with_stub_mode(true)
        .with_provider("alpha", ProviderConfig::new("https://alpha.test").with_limits(2, 10, 1))
        .build()
        .expect("valid");
    assert_eq!(config.providers.len(), 1);
    assert!(config.stub_mode);
}

#[test]
fn test_saved_file_loads_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("tollgate.toml");
    let config = ConfigBuilder::new()
        .with_provider(
            "alpha",
            ProviderConfig::new("https://alpha.test")
                .with_limits(7, 3, 2)
                .with_operation_cost("POST:/v1/analyze", 0.5),
        )
        .build()
        .expect("valid");

    let loader = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_prefix("TGCFG_SAVE");
    loader.save_to_file(&config, &path).expect("save");
    let loaded = loader.load().expect("load");

    assert_eq!(loaded.providers["alpha"], config.providers["alpha"]);
    assert_eq!(loaded.providers.len(), config.providers.len());
}
