//! Upstream response payload

use crate::constants::UPSTREAM_FAILURE_STATUS;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response returned by an upstream provider
///
/// This is the payload the cache stores, so it must round-trip through JSON.
/// Non-JSON bodies are kept as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lower-cased names)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Value,
    /// Set when the response was served from the cache
    #[serde(skip)]
    pub cached: bool,
}

impl UpstreamResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
            cached: false,
        }
    }

    /// Create a 200 response
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Parse a raw body, falling back to a JSON string for non-JSON payloads
    pub fn from_bytes(status: u16, headers: BTreeMap<String, String>, bytes: &[u8]) -> Self {
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
        };
        Self {
            status,
            headers,
            body,
            cached: false,
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status indicates success
    pub fn is_success(&self) -> bool {
        self.status < UPSTREAM_FAILURE_STATUS
    }

    /// Best-effort failure message extracted from the body
    pub fn error_message(&self) -> String {
        let from_body = match &self.body {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(map) => ["message", "error", "detail"]
                .iter()
                .find_map(|field| map.get(*field))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Object(inner) => inner
                        .get("message")
                        .and_then(Value::as_str)
                        .map_or_else(|| v.to_string(), str::to_string),
                    other => other.to_string(),
                }),
            _ => None,
        };
        from_body.unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}
