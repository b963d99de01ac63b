//! Configuration loading and validation

use crate::config::{
    AppConfig, CacheConfig, CircuitBreakerConfig, ProviderConfig, RateLimitConfig, StoreBackend,
    StoreConfig,
};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};
use tollgate_domain::error::{Error, Result};

/// Layers defaults, a TOML file and `TOLLGATE__*` variables into [`AppConfig`]
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Read this file instead of searching the default locations
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merge every source and validate the result
    ///
    /// Later sources win: built-in defaults (provider table included), then
    /// the config file, then the environment. An explicit path that does not
    /// exist is logged and skipped.
    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self
            .figment()
            .extract()
            .config_context("Failed to extract configuration")?;
        validate_app_config(&config)?;
        Ok(config)
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        let file = match &self.config_path {
            Some(path) if path.exists() => Some(path.clone()),
            Some(path) => {
                log_config_loaded(path, false);
                None
            }
            None => default_config_path(),
        };
        if let Some(path) = file {
            log_config_loaded(&path, true);
            figment = figment.merge(Toml::file(path));
        }

        // `__` nests so single underscores stay inside field names
        // (TOLLGATE__STORE__REDIS_URL)
        let env_prefix = format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix);
        figment.merge(Env::prefixed(&env_prefix).split(CONFIG_ENV_SEPARATOR))
    }

    /// Write `config` as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let rendered = toml::to_string_pretty(config).context("Failed to render config as TOML")?;
        std::fs::write(path.as_ref(), rendered).context("Failed to write config file")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `./tollgate.toml`, `./tollgate/tollgate.toml`, then the user config dir
fn default_config_path() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    [
        Some(cwd.join(DEFAULT_CONFIG_FILENAME)),
        Some(cwd.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
    ]
    .into_iter()
    .flatten()
    .find(|path| path.exists())
}

/// Validate application configuration
///
/// Fails fast on values that would make a component misbehave at runtime.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    validate_store_config(&config.store)?;
    validate_cache_config(&config.cache)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_circuit_breaker_config("circuit_breaker", &config.circuit_breaker)?;
    if config.upstream.timeout_secs == 0 {
        return Err(Error::configuration("Upstream timeout cannot be 0"));
    }
    for (name, provider) in &config.providers {
        validate_provider_config(name, provider)?;
    }
    Ok(())
}

fn validate_store_config(store: &StoreConfig) -> Result<()> {
    if store.backend == StoreBackend::Redis && store.redis_url.trim().is_empty() {
        return Err(Error::configuration(
            "Redis URL cannot be empty when the redis backend is selected",
        ));
    }
    if store.timeout_ms == 0 {
        return Err(Error::configuration("Store timeout cannot be 0"));
    }
    Ok(())
}

fn validate_cache_config(cache: &CacheConfig) -> Result<()> {
    if cache.enabled && cache.default_ttl_secs == 0 {
        return Err(Error::configuration(
            "Cache TTL cannot be 0 when cache is enabled",
        ));
    }
    if cache.enabled && cache.max_entries == 0 {
        return Err(Error::configuration(
            "Cache capacity cannot be 0 when cache is enabled",
        ));
    }
    Ok(())
}

fn validate_rate_limit_config(rate_limit: &RateLimitConfig) -> Result<()> {
    let policy = &rate_limit.default_policy;
    if policy.daily_limit == 0 || policy.burst_limit == 0 || policy.window_seconds == 0 {
        return Err(Error::configuration(
            "Default rate limit policy values cannot be 0",
        ));
    }
    Ok(())
}

fn validate_circuit_breaker_config(scope: &str, breaker: &CircuitBreakerConfig) -> Result<()> {
    if breaker.failure_threshold == 0 {
        return Err(Error::configuration(format!(
            "{scope}: failure threshold cannot be 0"
        )));
    }
    if breaker.success_threshold == 0 {
        return Err(Error::configuration(format!(
            "{scope}: success threshold cannot be 0"
        )));
    }
    if breaker.half_open_max_calls == 0 {
        return Err(Error::configuration(format!(
            "{scope}: half-open call limit cannot be 0"
        )));
    }
    Ok(())
}

fn validate_provider_config(name: &str, provider: &ProviderConfig) -> Result<()> {
    if name.trim().is_empty() || name.contains(':') {
        return Err(Error::configuration(format!(
            "Invalid provider name '{name}': must be non-empty and contain no ':'"
        )));
    }
    let base_url = provider.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(Error::configuration(format!(
            "Provider '{name}' needs an http(s) base_url, got '{}'",
            provider.base_url
        )));
    }
    if provider.daily_limit == 0 || provider.burst_limit == 0 || provider.window_seconds == 0 {
        return Err(Error::configuration(format!(
            "Provider '{name}': rate limit values cannot be 0"
        )));
    }
    let costs_valid = provider.cost_per_call >= 0.0
        && provider.costs.values().all(|c| *c >= 0.0)
        && provider.token_cost_per_1k.is_none_or(|c| c >= 0.0);
    if !costs_valid {
        return Err(Error::configuration(format!(
            "Provider '{name}': costs cannot be negative"
        )));
    }
    if let Some(breaker) = &provider.circuit_breaker {
        validate_circuit_breaker_config(&format!("providers.{name}.circuit_breaker"), breaker)?;
    }
    Ok(())
}

/// Programmatic configuration, validated on [`build`](Self::build)
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    /// Defaults, built-in providers included
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Defaults with no providers
    pub fn empty() -> Self {
        Self {
            config: AppConfig::without_providers(),
        }
    }

    pub fn with_stub_mode(mut self, stub_mode: bool) -> Self {
        self.config.stub_mode = stub_mode;
        self
    }

    /// Add or replace a provider
    pub fn with_provider<S: Into<String>>(mut self, name: S, provider: ProviderConfig) -> Self {
        self.config.providers.insert(name.into(), provider);
        self
    }

    pub fn build(self) -> Result<AppConfig> {
        validate_app_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
