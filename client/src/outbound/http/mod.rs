//! Reqwest-backed clients for the admin API and the OTP endpoints.
//!
//! These adapters own transport details only: URL assembly, headers, JSON
//! encoding, and conversion of every failure into a
//! [`NormalizedError`](crate::domain::NormalizedError).

mod api_client;
mod auth_client;
mod normalizer;
mod transport;

pub use api_client::{ApiClient, ApiFailure, RequestOptions};
pub use auth_client::{AuthClient, SEND_CODE_PATH, VERIFY_CODE_PATH};
pub use normalizer::{normalize_fault, normalize_response};
