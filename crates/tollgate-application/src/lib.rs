//! Application Layer - tollgate
//!
//! The request orchestrator: the single code path every outbound provider
//! call goes through. It composes the resilience services defined as ports
//! in `tollgate-domain` and has no dependency on their implementations.
//!
//! ## Use Cases
//!
//! - Executing a provider request (cache, quota, circuit, call, record)
//! - Per-provider health, usage and reset operations
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `tollgate-domain`: ports, value objects and the error taxonomy
//! - tokio for the bounded upstream call

pub mod domain_services;
pub mod use_cases;

pub use domain_services::*;
pub use use_cases::*;
