//! Credential storage with durable and session-scoped lifetimes.
//!
//! The store owns both slots explicitly and is shared with the clients that
//! need it, rather than living in process-global state.

use std::sync::Arc;

use tracing::{debug, warn};

use super::Credential;
use super::ports::{KeyValueStore, StorageError};

/// Key under which the current credential is stored.
pub const TOKEN_KEY: &str = "auth";
/// Key used by earlier releases; cleared on logout.
pub const LEGACY_TOKEN_KEY: &str = "authToken";

/// Credential store over a durable and a session-scoped slot.
pub struct TokenStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    /// Build a store over the given slots.
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Store `value` durably when `durable` is set, otherwise for the session.
    ///
    /// The other slot is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the chosen slot cannot be written.
    pub fn write(&self, value: &str, durable: bool) -> Result<(), StorageError> {
        let slot = if durable { &self.durable } else { &self.session };
        slot.set(TOKEN_KEY, value)?;
        debug!(durable, "credential stored");
        Ok(())
    }

    /// Current credential: durable first, then session.
    ///
    /// Unreadable or empty slots count as absent.
    pub fn read(&self) -> Option<Credential> {
        read_slot(self.durable.as_ref(), "durable")
            .or_else(|| read_slot(self.session.as_ref(), "session"))
            .map(Credential::new)
    }

    /// Remove the credential, including the legacy key, from both slots.
    ///
    /// Every removal is attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] encountered.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_error = None;
        for slot in [&self.durable, &self.session] {
            for key in [TOKEN_KEY, LEGACY_TOKEN_KEY] {
                if let Err(err) = slot.remove(key) {
                    warn!(key, error = %err, "failed to clear credential");
                    first_error.get_or_insert(err);
                }
            }
        }
        debug!("credentials cleared");
        first_error.map_or(Ok(()), Err)
    }
}

fn read_slot(slot: &dyn KeyValueStore, lifetime: &str) -> Option<String> {
    match slot.get(TOKEN_KEY) {
        Ok(value) => value.filter(|token| !token.is_empty()),
        Err(err) => {
            warn!(lifetime, error = %err, "credential slot unreadable; treating as empty");
            None
        }
    }
}
