//! Domain primitives and login orchestration.
//!
//! Purpose: define the credential, device identity, and normalized error
//! types shared by every adapter, plus the ports those adapters implement.
//!
//! Public surface:
//! - NormalizedError (alias to `error::NormalizedError`): uniform failure
//!   shape returned by every client call.
//! - TokenStore: credential storage over durable and session stores.
//! - LoginFlow: OTP login sequence over a `VerificationGateway`.

pub mod auth;
pub mod config_error;
pub mod credential;
pub mod device_identity;
pub mod error;
pub mod login_flow;
pub mod ports;
pub mod token_store;

pub use self::auth::{LoginValidationError, MobileNumber, VerificationCode};
pub use self::config_error::ConfigError;
pub use self::credential::Credential;
pub use self::device_identity::{DEVICE_ID_KEY, DeviceIdentity};
pub use self::error::{ErrorCode, FieldErrors, NormalizedError};
pub use self::login_flow::{LoginError, LoginFlow, RESEND_COOLDOWN_SECONDS};
pub use self::token_store::{LEGACY_TOKEN_KEY, TOKEN_KEY, TokenStore};
