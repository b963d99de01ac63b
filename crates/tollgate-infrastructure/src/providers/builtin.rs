//! Built-in provider table
//!
//! Quotas mirror each provider's published plan limits; cache validity is
//! long for expensive, slow-changing analyses and short or zero for
//! status-like or side-effecting calls.

use crate::config::ProviderConfig;
use std::collections::BTreeMap;
use tollgate_domain::value_objects::HttpMethod;

/// Search provider
pub const SERPAPI: &str = "serpapi";
/// Page-analysis provider
pub const PAGESPEED: &str = "pagespeed";
/// Billing provider
pub const STRIPE: &str = "stripe";
/// Messaging provider
pub const TWILIO: &str = "twilio";
/// AI-completion provider
pub const OPENAI: &str = "openai";

/// Default provider table
pub fn builtin_providers() -> BTreeMap<String, ProviderConfig> {
    let mut providers = BTreeMap::new();

    providers.insert(
        SERPAPI.to_string(),
        ProviderConfig::new("https://serpapi.com")
            .with_limits(5_000, 5, 1)
            .with_cache_ttl_secs(86_400)
            .with_cost_per_call(0.01)
            .with_auth("SERPAPI_API_KEY", "authorization", "Bearer "),
    );

    providers.insert(
        PAGESPEED.to_string(),
        ProviderConfig::new("https://www.googleapis.com/pagespeedonline/v5")
            .with_limits(25_000, 4, 1)
            .with_cache_ttl_secs(7 * 86_400)
            .with_auth("PAGESPEED_API_KEY", "x-goog-api-key", ""),
    );

    providers.insert(
        STRIPE.to_string(),
        ProviderConfig::new("https://api.stripe.com")
            .with_limits(100_000, 25, 1)
            .with_cache_ttl_secs(300)
            .with_auth("STRIPE_SECRET_KEY", "authorization", "Bearer "),
    );

    // Sending a message must never be answered from cache
    providers.insert(
        TWILIO.to_string(),
        ProviderConfig::new("https://api.twilio.com/2010-04-01")
            .with_limits(10_000, 10, 1)
            .with_cache_ttl_secs(0)
            .with_operation_cost("POST:/Messages.json", 0.0079)
            .with_auth("TWILIO_AUTH_HEADER", "authorization", "Basic "),
    );

    let mut openai = ProviderConfig::new("https://api.openai.com")
        .with_limits(10_000, 3, 1)
        .with_cache_ttl_secs(3_600)
        .with_cacheable_methods(vec![HttpMethod::Post])
        .with_auth("OPENAI_API_KEY", "authorization", "Bearer ");
    openai.token_cost_per_1k = Some(0.002);
    providers.insert(OPENAI.to_string(), openai);

    providers
}
