//! Authenticated client for the general admin API.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::transport::{json_body, map_transport_error, send_checked};
use crate::config::ClientSettings;
use crate::domain::{Credential, ErrorCode, NormalizedError, TokenStore};
use crate::session::ClientSignal;

const NETWORK_FALLBACK: &str = "Network request failed";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Method, extra headers, and body for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl RequestOptions {
    /// `GET` with no extra headers or body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `method` for the request.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header. A `Content-Type` here replaces the JSON default; an
    /// `Authorization` here is replaced whenever a credential is stored.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send `body` verbatim.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A failed API call: the normalized error plus any signal for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ApiFailure {
    error: NormalizedError,
    signal: Option<ClientSignal>,
}

impl ApiFailure {
    /// The normalized error.
    pub fn error(&self) -> &NormalizedError {
        &self.error
    }

    /// Signal the caller should act on, if any.
    pub fn signal(&self) -> Option<ClientSignal> {
        self.signal
    }

    /// Drop the signal and keep the error.
    pub fn into_error(self) -> NormalizedError {
        self.error
    }
}

impl From<NormalizedError> for ApiFailure {
    fn from(error: NormalizedError) -> Self {
        Self {
            error,
            signal: None,
        }
    }
}

/// Client for endpoints under the configured API base URL.
///
/// Every request carries `Content-Type: application/json` and, when a
/// credential is stored, `Authorization: Token <credential>`. A 401 clears
/// the stored credential and is reported with [`ClientSignal::Unauthorized`].
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Build a client for `settings.api_base_url()`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: &ClientSettings, tokens: Arc<TokenStore>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, settings.api_base_url(), tokens))
    }

    /// Build a client around an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens,
        }
    }

    /// Send a request to `endpoint` and return the raw 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiFailure`] for transport faults and non-2xx responses.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response, ApiFailure> {
        let url = format!("{}{endpoint}", self.base_url);
        let headers = build_headers(&options.headers, self.tokens.read().as_ref())?;
        debug!(method = %options.method, %url, "sending API request");

        let mut request = self.client.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        match send_checked(request, NETWORK_FALLBACK).await {
            Ok(response) => Ok(response),
            Err(error) if error.is_unauthorized() => Err(self.deauthenticate(error)),
            Err(error) => Err(error.into()),
        }
    }

    /// `GET` `endpoint` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiFailure`] as [`Self::request`] does.
    pub async fn get(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiFailure> {
        let response = self.request(endpoint, options.method(Method::GET)).await?;
        Ok(json_body(response, NETWORK_FALLBACK).await?)
    }

    /// `POST` `data` as JSON to `endpoint` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiFailure`] as [`Self::request`] does, or when `data`
    /// cannot be encoded.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &T,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiFailure> {
        self.send_json(endpoint, Method::POST, data, options).await
    }

    /// `PUT` `data` as JSON to `endpoint` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiFailure`] as [`Self::request`] does, or when `data`
    /// cannot be encoded.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &T,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiFailure> {
        self.send_json(endpoint, Method::PUT, data, options).await
    }

    /// `GET` `endpoint` and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiFailure`] as [`Self::request`] does, or a `parse_error`
    /// when the body does not decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiFailure> {
        let response = self
            .request(endpoint, RequestOptions::new().method(Method::GET))
            .await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_transport_error(&err, NETWORK_FALLBACK))?;
        serde_json::from_slice(&body).map_err(|err| {
            NormalizedError::new(
                ErrorCode::ParseError,
                format!("failed to decode response body: {err}"),
                status,
            )
            .into()
        })
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        data: &T,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiFailure> {
        let body = serde_json::to_vec(data).map_err(|err| {
            NormalizedError::new(
                ErrorCode::UnknownError,
                format!("failed to encode request body: {err}"),
                0,
            )
        })?;
        let response = self
            .request(endpoint, options.method(method).body(body))
            .await?;
        Ok(json_body(response, NETWORK_FALLBACK).await?)
    }

    fn deauthenticate(&self, error: NormalizedError) -> ApiFailure {
        warn!(status = StatusCode::UNAUTHORIZED.as_u16(), "credential rejected; clearing");
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "failed to clear rejected credential");
        }
        ApiFailure {
            error,
            signal: Some(ClientSignal::Unauthorized),
        }
    }
}

fn build_headers(
    caller: &[(String, String)],
    credential: Option<&Credential>,
) -> Result<HeaderMap, NormalizedError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    for (name, value) in caller {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            NormalizedError::network(format!("invalid header name '{name}': {err}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            NormalizedError::network(format!("invalid value for header '{name}': {err}"))
        })?;
        headers.insert(header_name, header_value);
    }

    if let Some(credential) = credential {
        let mut value = HeaderValue::from_str(&credential.authorization_header())
            .map_err(|err| NormalizedError::network(format!("invalid stored credential: {err}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
