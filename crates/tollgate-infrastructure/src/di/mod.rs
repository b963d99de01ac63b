//! Composition root
//!
//! Builds every resilience service from an [`AppConfig`](crate::config::AppConfig)
//! and hands them to the orchestrator as `Arc<dyn Trait>`. Tests replace the
//! clock, the shared stores or the transport through [`ContextBuilder`].

pub mod bootstrap;

pub use bootstrap::{ContextBuilder, TollgateContext, init_app};
