//! Upstream Transports
//!
//! - [`ReqwestTransport`] - pooled HTTP client for real providers
//! - [`StubTransport`] - scripted replies for stub mode and tests

pub mod client;
pub mod stub;

pub use client::{HttpClientConfig, ReqwestTransport};
pub use stub::{StubReply, StubTransport};
