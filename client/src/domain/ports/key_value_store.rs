//! Driven port for string key-value persistence.
//!
//! The token store and device identity provider persist through this port;
//! adapters decide whether a store is durable or scoped to the session.

use thiserror::Error;

/// Errors surfaced by key-value store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing medium could not be read.
    #[error("storage read failed: {message}")]
    Read {
        /// Description of the underlying failure.
        message: String,
    },
    /// The backing medium could not be written.
    #[error("storage write failed: {message}")]
    Write {
        /// Description of the underlying failure.
        message: String,
    },
    /// Stored contents could not be decoded.
    #[error("stored data is corrupt: {message}")]
    Corrupt {
        /// Description of the decode failure.
        message: String,
    },
}

impl StorageError {
    /// Build a [`StorageError::Read`].
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Build a [`StorageError::Write`].
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Build a [`StorageError::Corrupt`].
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Port for reading and writing string values by key.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Return the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing medium cannot be updated.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
