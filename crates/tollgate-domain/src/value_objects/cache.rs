//! Response cache value objects
//!
//! Fingerprints are derived from the provider, the endpoint and a canonical
//! serialization of the parameters, so the same logical request always maps
//! to the same key regardless of parameter insertion order.

use crate::constants::{CACHE_INDEX_PREFIX, CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL_SECS};
use crate::value_objects::{HttpMethod, RequestParams, UpstreamResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Namespaced cache fingerprint (`api_cache:{sha256-hex}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the fingerprint of a logical request
    ///
    /// Each field is hashed behind its length so `:` inside a provider or
    /// endpoint cannot shift bytes into a neighbour. GET keys depend only on
    /// provider, endpoint, parameters and body; every other method is hashed
    /// in too, so a HEAD reply is never served for a GET.
    pub fn derive(
        provider: &str,
        method: HttpMethod,
        endpoint: &str,
        params: &RequestParams,
        body: Option<&[u8]>,
    ) -> Self {
        let canonical = canonical_json(&Value::Object(params.clone()));

        let mut hasher = Sha256::new();
        hash_field(&mut hasher, provider.as_bytes());
        hash_field(&mut hasher, endpoint.as_bytes());
        hash_field(&mut hasher, canonical.as_bytes());
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            hash_field(&mut hasher, hex::encode(Sha256::digest(body)).as_bytes());
        }
        if method != HttpMethod::Get {
            hash_field(&mut hasher, method.as_str().as_bytes());
        }

        Self(format!("{CACHE_KEY_PREFIX}:{}", hex::encode(hasher.finalize())))
    }

    /// Wrap an existing key string
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as stored in the shared store
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hash_field(hasher: &mut Sha256, field: &[u8]) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field);
}

/// Index set listing one provider's cache keys
pub fn cache_index_key(provider: &str) -> String {
    format!("{CACHE_INDEX_PREFIX}:{provider}")
}

/// Serialize a JSON value with object keys sorted at every depth
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Write options for one cached response
///
/// `namespace` is the provider; stores index the key under it so a provider
/// reset can find every entry it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    pub ttl: Option<Duration>,
    pub namespace: Option<String>,
}

impl CacheEntryConfig {
    pub fn new() -> Self {
        Self {
            ttl: None,
            namespace: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_namespace(mut self, provider: impl Into<String>) -> Self {
        self.namespace = Some(provider.into());
        self
    }

    /// TTL to apply, [`DEFAULT_CACHE_TTL_SECS`] when unset
    pub fn effective_ttl(&self) -> Duration {
        self.ttl
            .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup counters reported by a cache store or the response cache
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Lookups that failed against the store and were served as misses
    pub errors: u64,
    /// `hits / (hits + misses)`, zero before any lookup
    pub hit_rate: f64,
}

impl CacheStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A fresh entry was found
    Hit(UpstreamResponse),
    /// No fresh entry
    Miss,
    /// The store could not be consulted; treat as a miss
    Degraded {
        /// Why the lookup failed
        reason: String,
    },
}

impl CacheLookup {
    /// The cached response, if any
    pub fn into_hit(self) -> Option<UpstreamResponse> {
        match self {
            Self::Hit(response) => Some(response),
            Self::Miss | Self::Degraded { .. } => None,
        }
    }
}
