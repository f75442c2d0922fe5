//! Error taxonomy for session operations
//!
//! Every failure source (local validation, transport, timeout, server reply,
//! response decoding, local save) is normalized into [`SessionError`] by the
//! service layer. `Display` yields the message shown to the user; raw
//! transport and parse errors are logged, never displayed.

use serde::Serialize;
use thiserror::Error;

/// Shown when analysis fails without a usable server message
pub const ANALYZE_FALLBACK_MESSAGE: &str = "Key analysis failed. Please try again.";

/// Shown when transposition fails without a usable server message
pub const TRANSPOSE_FALLBACK_MESSAGE: &str = "Something went wrong while transposing the file.";

/// Session operation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// Request exceeded its deadline
    #[error("Request timed out. The file may be too large; try a smaller file.")]
    Timeout,

    /// No response received (DNS failure, connection refused, dropped connection)
    #[error("Cannot reach server, check connection and try again.")]
    Unreachable,

    /// Server replied with a failure status; carries its `detail` or a fallback
    #[error("{0}")]
    Server(String),

    /// Response did not have the expected shape
    #[error("Unexpected response from server. Please try again.")]
    MalformedResponse,

    /// Transposed audio arrived but could not be written locally
    #[error("Could not save the transposed file: {0}")]
    SaveFailed(String),
}

/// Fieldless discriminant of [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Timeout,
    Unreachable,
    Server,
    MalformedResponse,
    SaveFailed,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Validation(_) => ErrorKind::Validation,
            SessionError::Timeout => ErrorKind::Timeout,
            SessionError::Unreachable => ErrorKind::Unreachable,
            SessionError::Server(_) => ErrorKind::Server,
            SessionError::MalformedResponse => ErrorKind::MalformedResponse,
            SessionError::SaveFailed(_) => ErrorKind::SaveFailed,
        }
    }

    /// User-facing message
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<kc_common::Error> for SessionError {
    fn from(err: kc_common::Error) -> Self {
        match err {
            kc_common::Error::InvalidInput(msg) => SessionError::Validation(msg),
            other => SessionError::Validation(other.to_string()),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
