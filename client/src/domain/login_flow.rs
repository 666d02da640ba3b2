//! Mobile OTP login: send a code, optionally resend it, verify it, and
//! persist the resulting credential.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::ports::{AuthClientError, StorageError, VerificationGateway};
use super::{
    Credential, LoginValidationError, MobileNumber, NormalizedError, TokenStore, VerificationCode,
};

/// Seconds a user must wait before another code can be requested.
pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Failures surfaced by [`LoginFlow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// User input was malformed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] LoginValidationError),
    /// The verification backend call failed.
    #[error(transparent)]
    Gateway(#[from] AuthClientError),
    /// The backend accepted the request but returned no usable body.
    #[error("Failed to send OTP. Please try again.")]
    CodeNotDelivered,
    /// A resend was accepted but returned no usable body.
    #[error("Failed to resend OTP. Please try again.")]
    ResendNotDelivered,
    /// Verify or resend was attempted before a code was sent.
    #[error("no verification code has been requested")]
    CodeNotRequested,
    /// A new code was requested during the cooldown.
    #[error("Please wait {remaining_seconds}s before requesting a new OTP")]
    ResendCooldown {
        /// Seconds until another code may be requested.
        remaining_seconds: i64,
    },
    /// Verification succeeded without a credential in the response.
    #[error("Verification successful but no token received from server")]
    MissingToken,
    /// The credential could not be stored.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LoginError {
    /// Backend error behind this failure, if a request was made.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Gateway(AuthClientError::Request(err)) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingCode {
    mobile: MobileNumber,
    sent_at: DateTime<Utc>,
}

/// Stateful login sequence over a [`VerificationGateway`].
pub struct LoginFlow {
    gateway: Arc<dyn VerificationGateway>,
    tokens: Arc<TokenStore>,
    clock: Arc<dyn Clock>,
    pending: Option<PendingCode>,
}

impl LoginFlow {
    /// Start a flow in the mobile-entry state.
    ///
    /// ```rust,ignore
    /// let flow = LoginFlow::new(Arc::new(auth_client), tokens, Arc::new(DefaultClock));
    /// ```
    pub fn new(
        gateway: Arc<dyn VerificationGateway>,
        tokens: Arc<TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            clock,
            pending: None,
        }
    }

    /// Validate `raw_mobile` and ask the backend to send a code.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Validation`] for malformed input,
    /// [`LoginError::Gateway`] when the call fails, and
    /// [`LoginError::CodeNotDelivered`] when the backend returned no body.
    pub async fn send_code(&mut self, raw_mobile: &str) -> Result<Value, LoginError> {
        let mobile = MobileNumber::parse(raw_mobile)?;
        let response = self
            .request_code(&mobile)
            .await?
            .ok_or(LoginError::CodeNotDelivered)?;
        info!(mobile = %mobile.redacted(), "verification code sent");
        self.pending = Some(PendingCode {
            mobile,
            sent_at: self.clock.utc(),
        });
        Ok(response)
    }

    /// Request another code for the pending mobile number.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::CodeNotRequested`] before [`Self::send_code`],
    /// [`LoginError::ResendCooldown`] while the cooldown runs,
    /// [`LoginError::ResendNotDelivered`] when the backend returned no body,
    /// and [`LoginError::Gateway`] when the call fails.
    pub async fn resend_code(&mut self) -> Result<Value, LoginError> {
        let mobile = self
            .pending
            .as_ref()
            .map(|pending| pending.mobile.clone())
            .ok_or(LoginError::CodeNotRequested)?;
        if let Some(remaining_seconds) = self.resend_available_in() {
            return Err(LoginError::ResendCooldown { remaining_seconds });
        }

        let response = self
            .request_code(&mobile)
            .await?
            .ok_or(LoginError::ResendNotDelivered)?;
        info!(mobile = %mobile.redacted(), "verification code resent");
        self.pending = Some(PendingCode {
            mobile,
            sent_at: self.clock.utc(),
        });
        Ok(response)
    }

    /// Seconds left before a resend is allowed, `None` when allowed now.
    pub fn resend_available_in(&self) -> Option<i64> {
        let pending = self.pending.as_ref()?;
        let deadline = pending.sent_at + TimeDelta::seconds(RESEND_COOLDOWN_SECONDS);
        let remaining = deadline - self.clock.utc();
        (remaining > TimeDelta::zero()).then(|| remaining.num_seconds().max(1))
    }

    /// Verify `raw_code` and store the returned credential durably.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Validation`] for malformed input,
    /// [`LoginError::CodeNotRequested`] before [`Self::send_code`],
    /// [`LoginError::Gateway`] when verification fails,
    /// [`LoginError::MissingToken`] when the response has no token, and
    /// [`LoginError::Storage`] when the credential cannot be stored.
    pub async fn verify(&mut self, raw_code: &str) -> Result<Credential, LoginError> {
        let code = VerificationCode::parse(raw_code)?;
        let mobile = self
            .pending
            .as_ref()
            .map(|pending| pending.mobile.clone())
            .ok_or(LoginError::CodeNotRequested)?;

        let response = self
            .gateway
            .verify_code(mobile.as_str(), code.as_str())
            .await?;
        let token = response
            .as_ref()
            .and_then(|body| body.get("token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or(LoginError::MissingToken)?;

        self.tokens.write(token, true)?;
        self.pending = None;
        info!(mobile = %mobile.redacted(), "login verified");
        Ok(Credential::new(token))
    }

    /// Return to the mobile-entry state.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Mobile number awaiting verification, if a code was sent.
    pub fn pending_mobile(&self) -> Option<&MobileNumber> {
        self.pending.as_ref().map(|pending| &pending.mobile)
    }

    /// Body of a send call, `None` when the backend returned nothing usable.
    async fn request_code(&self, mobile: &MobileNumber) -> Result<Option<Value>, LoginError> {
        let response = self.gateway.send_code(mobile.as_str()).await?;
        Ok(response.filter(|body| !body.is_null()))
    }
}
