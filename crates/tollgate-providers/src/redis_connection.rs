//! Shared Redis connection handling
//!
//! One lazily established [`ConnectionManager`] per store. The manager
//! reconnects on its own; every operation is bounded by the configured
//! timeout so an unreachable server surfaces as an error quickly instead of
//! stalling the caller.

use redis::aio::ConnectionManager;
use redis::{Client, RedisResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tollgate_domain::error::{Error, Result};

/// Lazily connected Redis handle with bounded operations
pub(crate) struct RedisConnection {
    client: Client,
    address: String,
    manager: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisConnection {
    /// Parse the URL; no connection is made until first use
    pub(crate) fn open(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            Error::infrastructure_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            address: redact(url),
            manager: OnceCell::new(),
            timeout,
        })
    }

    /// Get a connection, connecting on first use
    pub(crate) async fn get(&self) -> Result<ConnectionManager> {
        let init = self
            .manager
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()));

        match tokio::time::timeout(self.timeout, init).await {
            Ok(Ok(manager)) => Ok(manager.clone()),
            Ok(Err(e)) => Err(Error::infrastructure_with_source(
                format!("Failed to connect to Redis: {e}"),
                e,
            )),
            Err(_) => Err(Error::infrastructure(format!(
                "Redis connection timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Run one Redis operation under the store timeout
    pub(crate) async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Error::infrastructure_with_source(
                format!("Redis {op} failed: {e}"),
                e,
            )),
            Err(_) => Err(Error::infrastructure(format!(
                "Redis {op} timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Server address with credentials removed
    pub(crate) fn server_address(&self) -> &str {
        &self.address
    }
}

fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}{}", &url[..scheme_end + 3], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
