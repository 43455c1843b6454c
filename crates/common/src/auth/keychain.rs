//! Credential store backed by a [`SecretStore`] (normally the OS keychain).
//!
//! # Module Layering
//!
//! - **`security::keychain`**: generic named-secret storage
//! - **`auth::keychain`** (this module): the three OAuth fields, packed into
//!   one JSON secret so a write or delete is a single keychain operation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::{CredentialStore, CredentialStoreError};
use super::types::PersistedCredentials;
use crate::security::{KeychainError, KeychainProvider, SecretStore};

/// Keychain account under which the credential blob is stored.
pub const CREDENTIALS_ACCOUNT: &str = "kakao_credentials";

#[derive(Serialize, Deserialize)]
struct CredentialBlob {
    kakao_access_token: String,
    kakao_refresh_token: String,
    kakao_token_expiry: String,
}

/// [`CredentialStore`] over a keychain service.
pub struct KeychainCredentialStore<S: SecretStore = KeychainProvider> {
    secrets: S,
}

impl<S: SecretStore> KeychainCredentialStore<S> {
    pub fn new(secrets: S) -> Self {
        Self { secrets }
    }
}

fn backend_error(err: KeychainError) -> CredentialStoreError {
    CredentialStoreError::Backend(err.to_string())
}

#[async_trait]
impl<S: SecretStore> CredentialStore for KeychainCredentialStore<S> {
    async fn load(&self) -> Result<Option<PersistedCredentials>, CredentialStoreError> {
        let raw = match self.secrets.get_secret(CREDENTIALS_ACCOUNT) {
            Ok(raw) => raw,
            Err(KeychainError::NotFound) => return Ok(None),
            Err(e) => return Err(backend_error(e)),
        };

        let blob: CredentialBlob = match serde_json::from_str(&raw) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable keychain credentials");
                return Ok(None);
            }
        };
        let Ok(expires_at_epoch_ms) = blob.kakao_token_expiry.parse::<i64>() else {
            warn!("Discarding keychain credentials with invalid expiry");
            return Ok(None);
        };

        debug!("Loaded credentials from keychain");
        Ok(Some(PersistedCredentials {
            access_token: blob.kakao_access_token,
            refresh_token: Some(blob.kakao_refresh_token).filter(|t| !t.is_empty()),
            expires_at_epoch_ms,
        }))
    }

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), CredentialStoreError> {
        let blob = CredentialBlob {
            kakao_access_token: credentials.access_token.clone(),
            kakao_refresh_token: credentials.refresh_token.clone().unwrap_or_default(),
            kakao_token_expiry: credentials.expires_at_epoch_ms.to_string(),
        };
        let raw = serde_json::to_string(&blob)
            .map_err(|e| CredentialStoreError::Corrupted(e.to_string()))?;
        self.secrets.set_secret(CREDENTIALS_ACCOUNT, &raw).map_err(backend_error)
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.secrets.delete_secret(CREDENTIALS_ACCOUNT).map_err(backend_error)
    }
}

#[cfg(test)]
mod tests {
    //! Tests focus on credential packing; keychain access itself is mocked.
    use super::*;
    use crate::testing::MockKeychainProvider;

    fn sample() -> PersistedCredentials {
        PersistedCredentials {
            access_token: "A1".into(),
            refresh_token: Some("R1".into()),
            expires_at_epoch_ms: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn save_then_load_returns_all_fields() {
        let store = KeychainCredentialStore::new(MockKeychainProvider::new("test"));
        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn fields_live_in_one_secret() {
        let secrets = MockKeychainProvider::new("test");
        let store = KeychainCredentialStore::new(secrets.clone());
        store.save(&sample()).await.unwrap();

        let raw = secrets.get_secret(CREDENTIALS_ACCOUNT).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["kakao_access_token"], "A1");
        assert_eq!(json["kakao_refresh_token"], "R1");
        assert_eq!(json["kakao_token_expiry"], "1700000000000");
        assert_eq!(secrets.len(), 1);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = KeychainCredentialStore::new(MockKeychainProvider::new("test"));
        store.save(&sample()).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_blob_loads_as_absent() {
        let secrets = MockKeychainProvider::new("test");
        secrets.set_secret(CREDENTIALS_ACCOUNT, "not json").unwrap();
        let store = KeychainCredentialStore::new(secrets);
        assert_eq!(store.load().await.unwrap(), None);
    }
}
