//! Driven port for the OTP verification backend.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{ConfigError, NormalizedError};

/// Errors returned by the verification backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthClientError {
    /// Required configuration was missing; no request was attempted.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// The request was attempted and failed.
    #[error(transparent)]
    Request(#[from] NormalizedError),
}

/// Port for sending and verifying one-time codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    /// Ask the backend to send a code to `mobile`.
    ///
    /// Returns the decoded JSON body, or `None` when the body was not JSON.
    async fn send_code(&self, mobile: &str) -> Result<Option<Value>, AuthClientError>;

    /// Exchange `code` for a credential.
    ///
    /// Returns the decoded JSON body, or `None` when the body was not JSON.
    async fn verify_code(&self, mobile: &str, code: &str)
    -> Result<Option<Value>, AuthClientError>;
}
