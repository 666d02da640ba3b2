//! Send/receive helpers shared by the API and auth clients.

use hyper::ext::ReasonPhrase;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::normalizer::{normalize_fault, normalize_response};
use crate::domain::NormalizedError;

/// Send `request`, returning the response only when it is 2xx.
///
/// Faults before a response become `network_error`s carrying `fallback`
/// when the fault has no message of its own.
pub(super) async fn send_checked(
    request: RequestBuilder,
    fallback: &str,
) -> Result<Response, NormalizedError> {
    let response = request
        .send()
        .await
        .map_err(|err| map_transport_error(&err, fallback))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status_text(status, response.extensions().get::<ReasonPhrase>());
    // An unreadable error body is treated like a non-JSON one.
    let body = response.bytes().await.unwrap_or_default();
    Err(normalize_response(status.as_u16(), &reason, &body))
}

/// Reason phrase the server sent, else the canonical one for `status`.
fn status_text(status: StatusCode, reason: Option<&ReasonPhrase>) -> String {
    reason
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .or_else(|| status.canonical_reason())
        .unwrap_or_default()
        .to_owned()
}

/// Decode a successful body when the response declares JSON.
///
/// Non-JSON content types, undecodable bodies, and a JSON `null` all yield
/// `None`.
pub(super) async fn json_body(
    response: Response,
    fallback: &str,
) -> Result<Option<Value>, NormalizedError> {
    if !declares_json(&response) {
        return Ok(None);
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| map_transport_error(&err, fallback))?;
    Ok(serde_json::from_slice::<Value>(&body)
        .ok()
        .filter(|value| !value.is_null()))
}

pub(super) fn declares_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("application/json"))
}

pub(super) fn map_transport_error(error: &reqwest::Error, fallback: &str) -> NormalizedError {
    normalize_fault(&error.to_string(), fallback)
}

#[cfg(test)]
mod tests {
    //! Status line rendering.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn server_reason_phrase_is_preferred() {
        let reason = ReasonPhrase::from_static(b"Origin Error");
        let status = StatusCode::from_u16(520).expect("valid status");
        assert_eq!(status_text(status, Some(&reason)), "Origin Error");
    }

    #[rstest]
    #[case(500, "Internal Server Error")]
    #[case(404, "Not Found")]
    #[case(599, "")]
    fn canonical_reason_is_the_fallback(#[case] code: u16, #[case] expected: &str) {
        let status = StatusCode::from_u16(code).expect("valid status");
        assert_eq!(status_text(status, None), expected);
    }
}
