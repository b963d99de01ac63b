//! Outbound request types
//!
//! A [`RequestContext`] is created once per `execute` call and carries the
//! logical operation. An [`UpstreamRequest`] is the concrete HTTP request the
//! transport sends after the provider profile has resolved the base address
//! and headers.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Request parameters as an ordered JSON object
pub type RequestParams = Map<String, Value>;

/// HTTP method of an outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
}

impl HttpMethod {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Whether parameters travel in the query string rather than the body
    pub fn uses_query_params(&self) -> bool {
        matches!(self, Self::Get | Self::Delete | Self::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(Error::invalid_argument(format!(
                "Unsupported HTTP method: {other}"
            ))),
        }
    }
}

/// Ephemeral context of one outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Provider identifier
    pub provider: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint path relative to the provider's base address
    pub endpoint: String,
    /// Request parameters
    pub params: RequestParams,
    /// Optional raw request body
    pub body: Option<Vec<u8>>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(
        provider: impl Into<String>,
        method: HttpMethod,
        endpoint: impl Into<String>,
        params: RequestParams,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            provider: provider.into(),
            method,
            endpoint: endpoint.into(),
            params,
            body,
        }
    }

    /// Operation identifier (`METHOD:endpoint`) used for burst scoping and cost lookup
    pub fn operation(&self) -> String {
        format!("{}:{}", self.method, self.endpoint)
    }
}

/// Concrete HTTP request handed to an [`UpstreamTransport`](crate::ports::UpstreamTransport)
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Query string pairs
    pub query: Vec<(String, String)>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl UpstreamRequest {
    /// Build the upstream request for a context against a base URL
    ///
    /// Parameters go to the query string for GET/DELETE/HEAD. For other
    /// methods they become the JSON body unless an explicit body was given.
    pub fn from_context(
        ctx: &RequestContext,
        base_url: &str,
        headers: BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let url = join_url(base_url, &ctx.endpoint);
        let mut headers = headers;

        let (query, body) = if ctx.method.uses_query_params() {
            let query = ctx
                .params
                .iter()
                .map(|(k, v)| (k.clone(), query_value(v)))
                .collect();
            (query, ctx.body.clone())
        } else if let Some(body) = &ctx.body {
            (Vec::new(), Some(body.clone()))
        } else if ctx.params.is_empty() {
            (Vec::new(), None)
        } else {
            headers
                .entry("content-type".to_string())
                .or_insert_with(|| "application/json".to_string());
            let body = serde_json::to_vec(&Value::Object(ctx.params.clone()))?;
            (Vec::new(), Some(body))
        };

        Ok(Self {
            method: ctx.method,
            url,
            headers,
            query,
            body,
            timeout,
        })
    }
}

fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
