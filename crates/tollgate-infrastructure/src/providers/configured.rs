//! Configuration-driven provider profile

use crate::config::ProviderConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tollgate_domain::ports::ProviderProfile;
use tollgate_domain::value_objects::{
    HttpMethod, RateLimitPolicy, RequestContext, UpstreamResponse,
};
use tracing::warn;

/// Provider profile built from a [`ProviderConfig`]
#[derive(Debug, Clone)]
pub struct ConfiguredProvider {
    name: String,
    base_url: String,
    headers: BTreeMap<String, String>,
    policy: RateLimitPolicy,
    cache_ttl: Duration,
    cacheable_methods: Vec<HttpMethod>,
    cost_per_call: f64,
    costs: BTreeMap<String, f64>,
    token_cost_per_1k: Option<f64>,
}

impl ConfiguredProvider {
    /// Build a profile, resolving the credential header from the environment
    ///
    /// A missing credential is logged rather than rejected so stub mode
    /// works without secrets.
    pub fn from_config(name: &str, config: &ProviderConfig, default_ttl: Duration) -> Self {
        let mut headers: BTreeMap<String, String> = config
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();

        if let Some(auth) = &config.auth {
            match std::env::var(&auth.env) {
                Ok(secret) if !secret.is_empty() => {
                    headers.insert(
                        auth.header.to_ascii_lowercase(),
                        format!("{}{secret}", auth.prefix),
                    );
                }
                _ => warn!(
                    provider = name,
                    env = %auth.env,
                    "Provider credential not set, sending requests without it"
                ),
            }
        }

        Self {
            name: name.to_string(),
            base_url: config.base_url.clone(),
            headers,
            policy: config.rate_limit_policy(),
            cache_ttl: config
                .cache_ttl_secs
                .map_or(default_ttl, Duration::from_secs),
            cacheable_methods: config.cacheable_methods.clone(),
            cost_per_call: config.cost_per_call,
            costs: config.costs.clone(),
            token_cost_per_1k: config.token_cost_per_1k,
        }
    }
}

/// `usage.total_tokens` as reported by completion-style APIs
fn total_tokens(body: &Value) -> Option<u64> {
    body.get("usage")?.get("total_tokens")?.as_u64()
}

impl ProviderProfile for ConfiguredProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> BTreeMap<String, String> {
        self.headers.clone()
    }

    fn rate_limit_policy(&self) -> RateLimitPolicy {
        self.policy
    }

    fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    fn cost(&self, operation: &str, response: &UpstreamResponse) -> f64 {
        let flat = self
            .costs
            .get(operation)
            .copied()
            .unwrap_or(self.cost_per_call);
        let tokens = match (self.token_cost_per_1k, total_tokens(&response.body)) {
            (Some(rate), Some(tokens)) => rate * tokens as f64 / 1_000.0,
            _ => 0.0,
        };
        flat + tokens
    }

    fn cacheable(&self, ctx: &RequestContext) -> bool {
        !self.cache_ttl.is_zero() && self.cacheable_methods.contains(&ctx.method)
    }
}
