//! Normalized error shape shared by every client failure path.
//!
//! Outbound adapters convert transport faults, malformed bodies, and backend
//! error envelopes into a [`NormalizedError`], so callers handle exactly one
//! error type regardless of where a request failed.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field name mapped to the ordered messages reported for that field.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Machine-readable failure category.
///
/// Backend-supplied codes outside the known taxonomy are preserved verbatim
/// in [`ErrorCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    /// Input was rejected; field-level detail may be available.
    ValidationError,
    /// The credential was missing, expired, or rejected.
    AuthenticationFailed,
    /// The requested resource does not exist.
    NotFound,
    /// Authenticated but not permitted.
    Forbidden,
    /// The backend failed internally.
    InternalError,
    /// No response was obtained from the server.
    NetworkError,
    /// The response body was not valid JSON.
    ParseError,
    /// The failure could not be classified.
    UnknownError,
    /// A backend code outside the known taxonomy.
    Other(String),
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ValidationError => "validation_error",
            Self::AuthenticationFailed => "authentication_failed",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::InternalError => "internal_error",
            Self::NetworkError => "network_error",
            Self::ParseError => "parse_error",
            Self::UnknownError => "unknown_error",
            Self::Other(code) => code.as_str(),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        match value {
            "validation_error" => Self::ValidationError,
            "authentication_failed" => Self::AuthenticationFailed,
            "not_found" => Self::NotFound,
            "forbidden" => Self::Forbidden,
            "internal_error" => Self::InternalError,
            "network_error" => Self::NetworkError,
            "parse_error" => Self::ParseError,
            "unknown_error" => Self::UnknownError,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(value: ErrorCode) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform error produced for every failed request.
///
/// ## Invariants
/// - `status` is `0` when no transport response was received.
/// - `details` is empty unless the backend reported field-level errors.
///
/// # Examples
/// ```
/// use admin_client::domain::{ErrorCode, NormalizedError};
///
/// let err = NormalizedError::network("connection refused");
/// assert_eq!(err.code(), &ErrorCode::NetworkError);
/// assert_eq!(err.status(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    code: ErrorCode,
    message: String,
    #[serde(default)]
    details: FieldErrors,
    #[serde(default)]
    status: u16,
}

impl NormalizedError {
    /// Create an error without field details.
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: FieldErrors::new(),
            status,
        }
    }

    /// Error for a request that never obtained a response.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message, 0)
    }

    /// Error for a failed response whose body could not be decoded.
    pub fn unparseable(status: u16, status_text: &str) -> Self {
        Self::new(
            ErrorCode::ParseError,
            format!("HTTP {status}: {status_text}"),
            status,
        )
    }

    /// Attach field-level details.
    #[must_use]
    pub fn with_details(mut self, details: FieldErrors) -> Self {
        self.details = details;
        self
    }

    /// Failure category.
    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// Human-readable summary.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Field-level messages keyed by field name.
    pub fn details(&self) -> &FieldErrors {
        &self.details
    }

    /// Transport status, `0` when no response was received.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the backend rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NormalizedError {}
