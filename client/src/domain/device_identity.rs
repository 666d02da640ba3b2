//! Stable per-installation device identifier.

use std::sync::Arc;

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, warn};

use super::ports::KeyValueStore;

/// Durable key holding the device identifier.
pub const DEVICE_ID_KEY: &str = "device_id";

const DEVICE_ID_BYTES: usize = 32;

/// Lazily creates and persists the identifier reported on verification.
pub struct DeviceIdentity {
    durable: Arc<dyn KeyValueStore>,
}

impl DeviceIdentity {
    /// Provider persisting into `durable`.
    pub fn new(durable: Arc<dyn KeyValueStore>) -> Self {
        Self { durable }
    }

    /// Stored identifier, generating and persisting one on first use.
    ///
    /// The identifier is 32 bytes from the operating-system CSPRNG rendered
    /// as 64 lowercase hex characters. If it cannot be persisted the fresh
    /// value is still returned.
    pub fn device_id(&self) -> String {
        match self.durable.get(DEVICE_ID_KEY) {
            Ok(Some(existing)) if !existing.is_empty() => return existing,
            Ok(_) => {}
            Err(err) => warn!(error = %err, "device id unreadable; generating a new one"),
        }

        let device_id = generate_device_id();
        match self.durable.set(DEVICE_ID_KEY, &device_id) {
            Ok(()) => debug!("device id generated"),
            Err(err) => warn!(error = %err, "failed to persist device id"),
        }
        device_id
    }
}

fn generate_device_id() -> String {
    let mut bytes = [0_u8; DEVICE_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
