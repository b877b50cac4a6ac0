//! Application services
//!
//! Concrete service implementations that orchestrate remote calls.
//! Services depend on I/O boundary traits (ContentApi, Sleeper)
//! but are themselves concrete structs, not traits.

mod content;
mod staging;

pub use content::{ContentService, CriteriaGroup, EnvironmentStatus, NewFilter, ProjectDetails};
pub use staging::{RetryPolicy, StagingService};
