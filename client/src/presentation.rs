//! User-facing rendering of errors.
//!
//! A backend message always wins. Otherwise the error code picks a fixed
//! sentence, and validation errors list their field messages.

use crate::domain::{ErrorCode, FieldErrors, NormalizedError};

const UNEXPECTED: &str = "An unexpected error occurred";
const VALIDATION_FALLBACK: &str = "Validation error occurred";

/// Anything a caller may want to show as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentableError<'a> {
    /// No error value at all.
    Absent,
    /// A message that is already human readable.
    Text(&'a str),
    /// A normalized backend error.
    Normalized(&'a NormalizedError),
}

impl<'a> From<&'a NormalizedError> for PresentableError<'a> {
    fn from(error: &'a NormalizedError) -> Self {
        Self::Normalized(error)
    }
}

impl<'a> From<&'a str> for PresentableError<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<Option<&'a NormalizedError>> for PresentableError<'a> {
    fn from(error: Option<&'a NormalizedError>) -> Self {
        error.map_or(Self::Absent, Self::Normalized)
    }
}

/// Render `error` as a single display string.
///
/// # Examples
/// ```
/// use admin_client::domain::{ErrorCode, NormalizedError};
/// use admin_client::presentation::format_error_message;
///
/// let err = NormalizedError::new(ErrorCode::NetworkError, "", 0);
/// assert_eq!(
///     format_error_message(&err),
///     "Network error. Please check your connection"
/// );
/// ```
pub fn format_error_message<'a>(error: impl Into<PresentableError<'a>>) -> String {
    match error.into() {
        PresentableError::Absent => UNEXPECTED.to_owned(),
        PresentableError::Text(text) if text.is_empty() => UNEXPECTED.to_owned(),
        PresentableError::Text(text) => text.to_owned(),
        PresentableError::Normalized(error) if !error.message().is_empty() => {
            error.message().to_owned()
        }
        PresentableError::Normalized(error) => describe_code(error),
    }
}

/// Field-level messages carried by `error`, empty when there are none.
pub fn field_errors<'a>(error: impl Into<PresentableError<'a>>) -> FieldErrors {
    match error.into() {
        PresentableError::Normalized(error) => error.details().clone(),
        PresentableError::Absent | PresentableError::Text(_) => FieldErrors::new(),
    }
}

fn describe_code(error: &NormalizedError) -> String {
    let sentence = match error.code() {
        ErrorCode::ValidationError if !error.details().is_empty() => {
            return format_field_errors(error.details());
        }
        ErrorCode::ValidationError => "Please check your input and try again",
        ErrorCode::AuthenticationFailed => "Your session has expired. Please login again.",
        ErrorCode::NotFound => "The requested resource was not found",
        ErrorCode::Forbidden => "You do not have permission to perform this action",
        ErrorCode::InternalError => "A server error occurred. Please try again later",
        ErrorCode::NetworkError => "Network error. Please check your connection",
        ErrorCode::ParseError => "Failed to process server response",
        ErrorCode::UnknownError => UNEXPECTED,
        ErrorCode::Other(code) if code.is_empty() => UNEXPECTED,
        ErrorCode::Other(_) => "An error occurred",
    };
    sentence.to_owned()
}

fn format_field_errors(details: &FieldErrors) -> String {
    let lines: Vec<String> = details
        .iter()
        .flat_map(|(field, messages)| {
            let label = humanize_field(field);
            messages
                .iter()
                .map(move |message| format!("{label}: {message}"))
        })
        .collect();

    if lines.is_empty() {
        VALIDATION_FALLBACK.to_owned()
    } else {
        lines.join(". ")
    }
}

/// `first_name` becomes `First Name`.
fn humanize_field(field: &str) -> String {
    let mut label = String::with_capacity(field.len());
    let mut in_word = false;
    for ch in field.chars().map(|c| if c == '_' { ' ' } else { c }) {
        let is_word = ch.is_ascii_alphanumeric();
        if is_word && !in_word {
            label.push(ch.to_ascii_uppercase());
        } else {
            label.push(ch);
        }
        in_word = is_word;
    }
    label
}
