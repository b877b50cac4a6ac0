//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Errors raised by a remote API call.
///
/// This is the error type of the `ContentApi` boundary, the way
/// `std::io::Error` is for file access.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} failed: {message}")]
    Remote { method: String, message: String },

    #[error("login failed for user {user}: {message}")]
    Auth { user: String, message: String },

    #[error("unexpected response from {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn remote(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// Result type for remote API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt failed: {message}")]
    Prompt { message: String },

    #[error("line editor failed: {message}")]
    Shell { message: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<ApiError> for InfraError {
    fn from(e: ApiError) -> Self {
        Self::Application(ApplicationError::Api(e))
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
