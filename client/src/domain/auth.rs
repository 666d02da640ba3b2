//! Login inputs: mobile numbers and one-time codes.
//!
//! Raw user input is validated here before any request is made, so the
//! gateway only ever sees well-formed values.

use std::fmt;

const MOBILE_DIGITS: usize = 10;
const CODE_DIGITS: usize = 4;
const COUNTRY_PREFIX: &str = "+91";
const REVEALED_DIGITS: usize = 4;

/// Validation failures for login inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Mobile number was not exactly ten digits.
    InvalidMobile,
    /// Code was not exactly four digits.
    InvalidCode,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMobile => write!(f, "Please enter a valid 10-digit mobile number"),
            Self::InvalidCode => write!(f, "Please enter a valid 4-digit OTP"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Mobile number in the international form sent to the backend.
///
/// ## Invariants
/// - Always `+91` followed by exactly ten ASCII digits.
///
/// # Examples
/// ```
/// use admin_client::domain::MobileNumber;
///
/// let mobile = MobileNumber::parse("9876543210").unwrap();
/// assert_eq!(mobile.as_str(), "+919876543210");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Validate ten local digits and add the country prefix.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError::InvalidMobile`] for any other input.
    pub fn parse(raw: &str) -> Result<Self, LoginValidationError> {
        if is_digits(raw, MOBILE_DIGITS) {
            Ok(Self(format!("{COUNTRY_PREFIX}{raw}")))
        } else {
            Err(LoginValidationError::InvalidMobile)
        }
    }

    /// Prefixed number.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Number with all but the last four digits masked, for logs.
    pub fn redacted(&self) -> String {
        let digits = self.0.strip_prefix(COUNTRY_PREFIX).unwrap_or(&self.0);
        let hidden = digits.chars().count().saturating_sub(REVEALED_DIGITS);
        let masked: String = digits
            .chars()
            .enumerate()
            .map(|(i, digit)| if i < hidden { '*' } else { digit })
            .collect();
        format!("{COUNTRY_PREFIX}{masked}")
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four-digit one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Validate a four-digit code.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError::InvalidCode`] for any other input.
    pub fn parse(raw: &str) -> Result<Self, LoginValidationError> {
        if is_digits(raw, CODE_DIGITS) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(LoginValidationError::InvalidCode)
        }
    }

    /// The code as entered.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn is_digits(raw: &str, len: usize) -> bool {
    raw.len() == len && raw.bytes().all(|b| b.is_ascii_digit())
}
