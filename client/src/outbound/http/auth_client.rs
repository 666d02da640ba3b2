//! Client for the OTP send and verify endpoints.
//!
//! These calls never carry a credential. The auth base URL is resolved on
//! every call so a missing setting fails before any network traffic.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use super::transport::{json_body, send_checked};
use crate::config::ClientSettings;
use crate::domain::DeviceIdentity;
use crate::domain::ports::{AuthClientError, VerificationGateway};

/// Path, relative to the auth base URL, that sends a code.
pub const SEND_CODE_PATH: &str = "/a/auth/mobile/";
/// Path, relative to the auth base URL, that verifies a code.
pub const VERIFY_CODE_PATH: &str = "/a/auth/token/";

const SEND_FALLBACK: &str = "Failed to send OTP";
const VERIFY_FALLBACK: &str = "Failed to verify OTP";

/// Reqwest adapter for [`VerificationGateway`].
pub struct AuthClient {
    client: Client,
    settings: ClientSettings,
    identity: Arc<DeviceIdentity>,
}

impl AuthClient {
    /// Build a client using `settings` for URLs and the device type.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        settings: ClientSettings,
        identity: Arc<DeviceIdentity>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, settings, identity))
    }

    /// Build a client around an existing reqwest client.
    pub fn with_client(
        client: Client,
        settings: ClientSettings,
        identity: Arc<DeviceIdentity>,
    ) -> Self {
        Self {
            client,
            settings,
            identity,
        }
    }

    /// Request a code for `mobile`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthClientError::Configuration`] when the auth base URL is
    /// unset, otherwise [`AuthClientError::Request`] for any failed call.
    pub async fn send_verification_code(
        &self,
        mobile: &str,
    ) -> Result<Option<Value>, AuthClientError> {
        self.post(SEND_CODE_PATH, &json!({ "mobile": mobile }), SEND_FALLBACK)
            .await
    }

    /// Verify `code` for `mobile`, reporting this device's identity.
    ///
    /// # Errors
    ///
    /// As [`Self::send_verification_code`].
    pub async fn verify_code(
        &self,
        mobile: &str,
        code: &str,
    ) -> Result<Option<Value>, AuthClientError> {
        let base_url = self.settings.auth_base_url()?;
        let body = json!({
            "mobile": mobile,
            "token": code,
            "device_type": self.settings.device_type(),
            "device_id": self.identity.device_id(),
        });
        self.post_to(base_url, VERIFY_CODE_PATH, &body, VERIFY_FALLBACK)
            .await
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        fallback: &str,
    ) -> Result<Option<Value>, AuthClientError> {
        let base_url = self.settings.auth_base_url()?;
        self.post_to(base_url, path, body, fallback).await
    }

    async fn post_to(
        &self,
        base_url: &str,
        path: &str,
        body: &Value,
        fallback: &str,
    ) -> Result<Option<Value>, AuthClientError> {
        let url = format!("{base_url}{path}");
        debug!(%url, "posting to auth endpoint");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body.to_string());
        let response = send_checked(request, fallback).await?;
        Ok(json_body(response, fallback).await?)
    }
}

#[async_trait]
impl VerificationGateway for AuthClient {
    async fn send_code(&self, mobile: &str) -> Result<Option<Value>, AuthClientError> {
        self.send_verification_code(mobile).await
    }

    async fn verify_code(
        &self,
        mobile: &str,
        code: &str,
    ) -> Result<Option<Value>, AuthClientError> {
        Self::verify_code(self, mobile, code).await
    }
}
