//! Admin console API client.
//!
//! Sends authenticated JSON requests, runs the mobile OTP login, keeps the
//! credential in durable or session storage, and reduces every backend or
//! transport failure to one [`NormalizedError`](domain::NormalizedError).
//! An unauthorized response clears the credential and is reported to the
//! caller as a [`ClientSignal`](session::ClientSignal).

pub mod config;
pub mod domain;
pub mod outbound;
pub mod presentation;
pub mod session;
