//! Infrastructure layer: remote API client, I/O traits and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod http;
pub mod traits;

pub use error::{ApiError, ApiResult, InfraError, InfraResult};
