//! Outbound adapters: local persistence and the reqwest-backed HTTP clients.

pub mod http;
pub mod storage;
