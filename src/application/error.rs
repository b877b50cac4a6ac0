//! Application-level errors (wraps domain and API errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("staging step '{step}' still failing after {attempts} attempts: {source}")]
    Staging {
        step: String,
        attempts: u32,
        #[source]
        source: ApiError,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
