//! Generic keychain provider for secure credential storage
//!
//! Thin wrapper over the platform keychain (macOS Keychain, Windows
//! Credential Manager, Linux Secret Service) for storing named secrets under
//! one service name.
//!
//! ```no_run
//! use talkreport_common::security::{KeychainProvider, SecretStore};
//!
//! let keychain = KeychainProvider::new("TalkReport.kakao");
//! keychain.set_secret("kakao_credentials", "{...}")?;
//! let secret = keychain.get_secret("kakao_credentials")?;
//! # Ok::<(), talkreport_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Named secret storage.
pub trait SecretStore: Send + Sync {
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the backend rejects the write
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError>;

    /// # Errors
    /// Returns `KeychainError::NotFound` if no secret is stored under `key`
    fn get_secret(&self, key: &str) -> Result<String, KeychainError>;

    /// Delete a secret (idempotent).
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the backend rejects the delete
    fn delete_secret(&self, key: &str) -> Result<(), KeychainError>;
}

/// Keychain provider scoped to one service name
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "TalkReport.kakao")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {e}"))
        })
    }
}

impl SecretStore for KeychainProvider {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {key}: {e}"))
        })
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("Failed to retrieve secret for {key}: {e}"))
            }
        })
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {key}: {e}"
            ))),
        }
    }
}

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("Entry not found")]
    NotFound,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
