//! Domain layer: entities and lifecycle rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod completion;
pub mod diff;
pub mod entities;
pub mod error;
pub mod staging;

pub use completion::{
    command_names, completion_request, filter_candidates, split_line, ArgKind, CompletionRequest,
};
pub use diff::package_diff;
pub use entities::*;
pub use error::DomainError;
pub use staging::{staging_plan, StagingDirection, StagingStep};
