//! # Infrastructure Layer
//!
//! Resilience services, configuration, observability and the composition
//! root that wires them into the request orchestrator.
//!
//! ## Module Categories
//!
//! ### Resilience
//! | Module | Description |
//! |--------|-------------|
//! | [`resilience`] | Distributed rate limiter, per-provider circuit breakers |
//! | [`cache`] | Fingerprinting response cache with per-provider TTLs |
//!
//! ### Configuration & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered TOML/env configuration via figment |
//! | [`providers`] | Built-in and configured provider profiles |
//! | [`di`] | Composition root |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`metrics`] | Prometheus usage/cost recorder |
//! | [`health`] | Store reachability and provider health |
//! | [`logging`] | Structured logging with tracing |

pub mod cache;
pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod providers;
pub mod resilience;

pub use error_ext::ErrorContext;
