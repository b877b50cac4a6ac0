//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::{ApiError, InfraError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Prompt { .. } => crate::exitcode::NOINPUT,
                InfraError::Shell { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Staging { .. } => crate::exitcode::TEMPFAIL,
                    ApplicationError::Domain(d) => match d {
                        DomainError::InvalidFilterRule(_)
                        | DomainError::ProjectNotFound(_)
                        | DomainError::ChannelNotFound(_)
                        | DomainError::UnterminatedQuote(_) => crate::exitcode::USAGE,
                        DomainError::FilterNotFound { .. }
                        | DomainError::FilterNotAttached { .. }
                        | DomainError::InvalidTimestamp(_) => crate::exitcode::DATAERR,
                    },
                    ApplicationError::Api(api) => match api {
                        ApiError::Http(_) => crate::exitcode::UNAVAILABLE,
                        ApiError::Auth { .. } => crate::exitcode::NOPERM,
                        ApiError::Decode { .. } => crate::exitcode::PROTOCOL,
                        ApiError::Remote { .. } => crate::exitcode::SOFTWARE,
                    },
                },
            },
        }
    }
}
