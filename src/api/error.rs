//! API error taxonomy
//!
//! Errors raised by the transport and by the resolution layer. Only
//! [`ApiError::NotFound`] is ever intercepted by the core; every other
//! variant travels up to the command layer unchanged.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the API client and the resource layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or empty selector, or a wrapper built from the wrong input
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The requested identifier does not resolve
    #[error("Couldn't find '{0}'")]
    NotFound(String),

    /// The API refused a destructive operation because of resource state
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The API rejected the submitted attributes (422)
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Called an accessor on a resource whose remote representation is unavailable
    #[error("Operation '{operation}' not understood by {id}")]
    UnsupportedOperation { id: String, operation: String },

    #[error("API request failed: {status} - {message}")]
    Http { status: StatusCode, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Well-formed JSON of the wrong shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    /// Map an unsuccessful HTTP status to the matching error kind
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::InvalidRecord(message),
            _ => ApiError::Http { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ApiError::InvalidArguments(_) | ApiError::InvalidRecord(_) => exit_code::USAGE,
            ApiError::Unauthorized(_) => exit_code::AUTH,
            ApiError::NotFound(_) => exit_code::NOT_FOUND,
            ApiError::Forbidden(_) => exit_code::FORBIDDEN,
            ApiError::Conflict(_) => exit_code::CONFLICT,
            ApiError::Transport(_) => exit_code::TRANSPORT,
            _ => exit_code::GENERAL,
        }
    }
}

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const FORBIDDEN: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const TRANSPORT: i32 = 7;
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
