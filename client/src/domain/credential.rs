//! Opaque authentication credential.

use std::fmt;

use zeroize::Zeroizing;

/// Token proving an authenticated session.
///
/// The value is wiped from memory on drop and redacted from `Debug` output.
///
/// # Examples
/// ```
/// use admin_client::domain::Credential;
///
/// let credential = Credential::new("abc123");
/// assert_eq!(credential.expose(), "abc123");
/// assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wrap a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Raw token value for the authorization header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Value of the `Authorization` header carrying this credential.
    pub fn authorization_header(&self) -> String {
        format!("Token {}", self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
