//! Error types module
//!
//! All client-facing failures are unified under the `ClientError` enum. The
//! variant is the kind tag: transport-level HTTP failures, backend envelopes
//! reporting `success: false` despite a 2xx status, transport errors where no
//! response was received, client-side input rejection, and session-store I/O.
//! Errors are constructed at the boundary where the ambiguity originates and
//! never propagated as untyped data.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like an expired session
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response from the backend.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope reported `success: false`.
    #[error("{message}")]
    Business { status: u16, message: String },

    /// The transport never completed (connect failure, timeout, malformed body).
    #[error("Network error: {message}")]
    Network { message: String },

    /// Input rejected client-side before any request was sent.
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Local file or session store could not be read or written.
    #[error("Local storage error: {message}")]
    Storage { message: String },
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Storage {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation {
            message: format!("Validation error: {}", err),
        }
    }
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        ClientError::Network {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            message: message.into(),
        }
    }

    /// Get the error kind name for diagnostics
    pub fn error_type(&self) -> &'static str {
        match self {
            ClientError::Http { .. } => "Http",
            ClientError::Business { .. } => "Business",
            ClientError::Network { .. } => "Network",
            ClientError::Validation { .. } => "Validation",
            ClientError::Storage { .. } => "Storage",
        }
    }

    /// HTTP status carried by the error, when the backend responded at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } | ClientError::Business { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether this is an HTTP 401 response.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Http { status: 401, .. })
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ClientError::Http { status: 401, .. } => LogLevel::Warn,
            ClientError::Http { .. } => LogLevel::Error,
            ClientError::Business { .. } => LogLevel::Warn,
            ClientError::Network { .. } => LogLevel::Error,
            ClientError::Validation { .. } => LogLevel::Debug,
            ClientError::Storage { .. } => LogLevel::Error,
        }
    }
}
