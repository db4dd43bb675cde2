//! Error types module
//!
//! All client-side failures are unified under the `AppError` enum: transport
//! failures, HTTP status failures reported by the backend, local validation
//! failures, and session/IO problems.
//!
//! `ErrorMetadata::client_message` is the single place where an error is turned
//! into the text shown to the user, so every screen reports the same status the
//! same way.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a missing resource
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// HTTP status the backend answered with, if a response was received
    fn http_status(&self) -> Option<u16>;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether re-submitting the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// User-facing notification text
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please log in again.";
pub const FORBIDDEN_MESSAGE: &str =
    "Forbidden. You do not have permission to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please check your connection.";
pub const GENERIC_MESSAGE: &str = "An error occurred.";
pub const UNKNOWN_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bad request: {}", .0.as_deref().unwrap_or("no details"))]
    BadRequest(Option<String>),

    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("no details"))]
    Unauthorized(Option<String>),

    #[error("Forbidden: {}", .0.as_deref().unwrap_or("no details"))]
    Forbidden(Option<String>),

    #[error("Not found: {}", .0.as_deref().unwrap_or("no details"))]
    NotFound(Option<String>),

    #[error("Server error: {}", .0.as_deref().unwrap_or("no details"))]
    Server(Option<String>),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a non-success HTTP status and the server's optional `message` field
    /// to the matching variant.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 => AppError::BadRequest(message),
            401 => AppError::Unauthorized(message),
            403 => AppError::Forbidden(message),
            404 => AppError::NotFound(message),
            500 => AppError::Server(message),
            _ => AppError::Http { status, message },
        }
    }

    /// True when the backend rejected the bearer token and the session must end.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }

    /// True when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(crate::validation::first_message(&err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        AppError::Validation(_) => ("VALIDATION_ERROR", false, LogLevel::Debug),
        AppError::BadRequest(_) => ("BAD_REQUEST", false, LogLevel::Debug),
        AppError::Unauthorized(_) => ("UNAUTHORIZED", false, LogLevel::Warn),
        AppError::Forbidden(_) => ("FORBIDDEN", false, LogLevel::Warn),
        AppError::NotFound(_) => ("NOT_FOUND", false, LogLevel::Debug),
        AppError::Server(_) => ("SERVER_ERROR", true, LogLevel::Error),
        AppError::Http { status, .. } if *status >= 500 => ("SERVER_ERROR", true, LogLevel::Error),
        AppError::Http { .. } => ("HTTP_ERROR", false, LogLevel::Warn),
        AppError::Network(_) => ("NETWORK_ERROR", true, LogLevel::Warn),
        AppError::Session(_) => ("SESSION_ERROR", false, LogLevel::Warn),
        AppError::Io(_) => ("IO_ERROR", false, LogLevel::Error),
        AppError::Serialization(_) => ("SERIALIZATION_ERROR", false, LogLevel::Error),
        AppError::Internal(_) => ("INTERNAL_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status(&self) -> Option<u16> {
        match self {
            AppError::BadRequest(_) => Some(400),
            AppError::Unauthorized(_) => Some(401),
            AppError::Forbidden(_) => Some(403),
            AppError::NotFound(_) => Some(404),
            AppError::Server(_) => Some(500),
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(_) => UNAUTHORIZED_MESSAGE.to_string(),
            AppError::Forbidden(_) => FORBIDDEN_MESSAGE.to_string(),
            AppError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            AppError::Server(_) => SERVER_ERROR_MESSAGE.to_string(),
            AppError::BadRequest(message) | AppError::Http { message, .. } => message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
            AppError::Network(_) => NO_RESPONSE_MESSAGE.to_string(),
            AppError::InvalidInput(msg)
            | AppError::Validation(msg)
            | AppError::Session(msg)
            | AppError::Io(msg)
            | AppError::Serialization(msg)
            | AppError::Internal(msg) => {
                if msg.is_empty() {
                    UNKNOWN_MESSAGE.to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }
}
