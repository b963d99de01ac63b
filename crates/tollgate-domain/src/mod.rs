//! # Tollgate Domain
//!
//! Core types of the gateway resilience layer: the error taxonomy, request
//! and response value objects, rate-limit and circuit-breaker state, and the
//! port traits the other layers implement. Nothing here performs I/O.

/// Shared constants
pub mod constants;
/// Error types
pub mod error;
/// Port traits
pub mod ports;
/// Value objects
pub mod value_objects;

pub use error::{Error, GatewayError, Result};
pub use value_objects::*;
