//! # Tollgate
//!
//! A resilience layer for outbound calls to metered third-party APIs.
//! Every call goes through one orchestrated path: response cache, shared
//! rate limiter, per-provider circuit breaker, bounded upstream call, then
//! usage and cost recording.
//!
//! ## Example
//!
//! ```ignore
//! use tollgate::infrastructure::config::ConfigLoader;
//! use tollgate::infrastructure::di::init_app;
//! use tollgate::{GatewayServiceInterface, HttpMethod, RequestContext};
//!
//! let context = init_app(ConfigLoader::new().load()?).await?;
//! let request = RequestContext::new("serpapi", HttpMethod::Get, "/search", params, None);
//! let response = context.gateway().execute(request).await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - ports, value objects and the error taxonomy
//! - `application` - the request orchestrator
//! - `infrastructure` - resilience services, config, logging, metrics, bootstrap

/// Domain layer - ports, value objects and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use tollgate_domain::*;
}

/// Application layer - request orchestration
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use tollgate_application::*;
}

/// Infrastructure layer - resilience services, config, and bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use tollgate_infrastructure::*;
}

pub mod cli;

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use application::{GatewayServiceImpl, GatewayServiceInterface};
pub use infrastructure::di::{TollgateContext, init_app};
