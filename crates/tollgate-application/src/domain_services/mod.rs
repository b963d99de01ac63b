//! Application service interfaces

pub mod gateway;

pub use gateway::{GatewayServiceInterface, ResetSummary};
