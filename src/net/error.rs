//! Error types returned by every backend call.
//!
//! DESIGN
//! ======
//! The HTTP layer never navigates. It classifies each response into
//! `Ok(T)`, [`ApiError::AuthDenied`] or [`ApiError::Failed`], and the session
//! manager is the single place that reacts to `AuthDenied`.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt;

/// Result alias for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Outcome of a backend call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered `401`: credential missing, invalid or expired.
    #[error("authorization denied")]
    AuthDenied {
        /// Backend-provided `message`, if the error body carried one.
        message: Option<String>,
    },

    /// Validation, server, transport or decode failure.
    #[error("{0}")]
    Failed(Failure),
}

impl ApiError {
    /// Whether this error is the universal "credential invalid" signal.
    #[must_use]
    pub fn is_auth_denied(&self) -> bool {
        matches!(self, Self::AuthDenied { .. })
    }

    /// Collapse into a displayable [`Failure`].
    ///
    /// Used where a `401` means "credentials rejected" rather than
    /// "session expired", e.g. the login form.
    #[must_use]
    pub fn into_failure(self) -> Failure {
        match self {
            Self::AuthDenied { message } => Failure { status: Some(401), message },
            Self::Failed(failure) => failure,
        }
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        Self::Failed(failure)
    }
}

/// Details of a failed operation, shown to the user as a transient notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// HTTP status, absent for transport, timeout and local failures.
    pub status: Option<u16>,
    /// Backend-provided `message` field, or a locally produced one.
    pub message: Option<String>,
}

impl Failure {
    /// Failure with an HTTP status and optional backend message.
    #[must_use]
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self { status: Some(status), message }
    }

    /// Failure that never reached the backend or produced no usable response.
    #[must_use]
    pub fn transport() -> Self {
        Self { status: None, message: None }
    }

    /// Failure raised on the client itself (e.g. the token slot could not be written).
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        Self { status: None, message: Some(message.into()) }
    }

    /// The backend message, or `fallback` when there is none.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.status) {
            (Some(message), _) => f.write_str(message),
            (None, Some(status)) => write!(f, "request failed with status {status}"),
            (None, None) => f.write_str("request failed"),
        }
    }
}
