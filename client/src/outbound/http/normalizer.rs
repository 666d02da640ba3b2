//! Conversion of failed responses and transport faults into
//! [`NormalizedError`]s.
//!
//! Precedence, first match wins:
//! 1. a body that is not JSON (or is JSON `null`) is a `parse_error`;
//! 2. a 400 whose body is an object without a truthy `error` member and with
//!    at least one array member is a field-level `validation_error`;
//! 3. anything else is read as an `{"error": {code, message, details}}`
//!    envelope with defaults;
//! 4. a fault with no response at all is a `network_error`.

use serde_json::{Map, Value};

use crate::domain::{ErrorCode, FieldErrors, NormalizedError};

const VALIDATION_FALLBACK: &str = "Validation error occurred";
const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// Normalize a non-2xx response from its status line and raw body.
///
/// # Examples
/// ```
/// use admin_client::domain::ErrorCode;
/// use admin_client::outbound::http::normalize_response;
///
/// let err = normalize_response(500, "Internal Server Error", b"<html>oops</html>");
/// assert_eq!(err.code(), &ErrorCode::ParseError);
/// assert_eq!(err.message(), "HTTP 500: Internal Server Error");
/// ```
pub fn normalize_response(status: u16, status_text: &str, body: &[u8]) -> NormalizedError {
    let data: Value = match serde_json::from_slice(body) {
        Ok(Value::Null) | Err(_) => return NormalizedError::unparseable(status, status_text),
        Ok(data) => data,
    };

    match validation_fields(status, &data) {
        Some(fields) => field_validation_error(status, fields),
        None => envelope_error(status, &data),
    }
}

/// Normalize a fault that produced no response.
///
/// An empty fault message is replaced by `fallback`.
pub fn normalize_fault(message: &str, fallback: &str) -> NormalizedError {
    if message.is_empty() {
        NormalizedError::network(fallback)
    } else {
        NormalizedError::network(message)
    }
}

fn validation_fields(status: u16, data: &Value) -> Option<&Map<String, Value>> {
    let fields = data.as_object().filter(|_| status == 400)?;
    let carries_error = fields.get("error").is_some_and(is_truthy);
    (!carries_error && fields.values().any(Value::is_array)).then_some(fields)
}

fn field_validation_error(status: u16, fields: &Map<String, Value>) -> NormalizedError {
    let mut details = FieldErrors::new();
    let mut parts = Vec::new();

    for (field, value) in fields {
        match value {
            Value::Array(items) => {
                let messages: Vec<String> = items.iter().map(display_element).collect();
                parts.push(format!("{field}: {}", messages.join(", ")));
                details.insert(field.clone(), messages);
            }
            Value::String(message) => {
                parts.push(format!("{field}: {message}"));
                details.insert(field.clone(), vec![message.clone()]);
            }
            _ => {}
        }
    }

    let message = if parts.is_empty() {
        VALIDATION_FALLBACK.to_owned()
    } else {
        parts.join("; ")
    };
    NormalizedError::new(ErrorCode::ValidationError, message, status).with_details(details)
}

fn envelope_error(status: u16, data: &Value) -> NormalizedError {
    let envelope = data.get("error");
    let member = |name: &str| envelope.and_then(|error| error.get(name));

    let code = member("code")
        .and_then(truthy_text)
        .map_or_else(|| default_code(status), ErrorCode::from);
    let message = member("message")
        .and_then(truthy_text)
        .unwrap_or_else(|| GENERIC_MESSAGE.to_owned());
    let details = member("details")
        .and_then(Value::as_object)
        .map(envelope_details)
        .unwrap_or_default();

    NormalizedError::new(code, message, status).with_details(details)
}

fn default_code(status: u16) -> ErrorCode {
    if status == 400 {
        ErrorCode::ValidationError
    } else {
        ErrorCode::UnknownError
    }
}

fn envelope_details(details: &Map<String, Value>) -> FieldErrors {
    details
        .iter()
        .filter_map(|(field, value)| match value {
            Value::Array(items) => Some((field.clone(), items.iter().map(display_element).collect())),
            Value::String(message) => Some((field.clone(), vec![message.clone()])),
            _ => None,
        })
        .collect()
}

/// JavaScript-style truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        other if is_truthy(other) => Some(other.to_string()),
        _ => None,
    }
}

/// Render one array element the way a joined message list shows it.
fn display_element(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_element)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}
