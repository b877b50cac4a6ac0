//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid lifecycle requests.
/// These are independent of how the server is reached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid filter rule: {0} (expected allow or deny)")]
    InvalidFilterRule(String),

    #[error("filter not found: {name}")]
    FilterNotFound { name: String },

    #[error("filter {name} is not attached to project {project}")]
    FilterNotAttached { project: String, name: String },

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("software channel does not exist: {0}")]
    ChannelNotFound(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unterminated quote in: {0}")]
    UnterminatedQuote(String),
}
