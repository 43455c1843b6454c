//! Traits for OAuth and credential storage operations
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (OAuth servers, durable credential storage).

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::{PersistedCredentials, TokenResponse};

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Consent page URL carrying `state` for CSRF validation.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange a one-time authorization code (`grant_type=authorization_code`).
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status, or unparsable body
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, OAuthClientError>;

    /// Exchange a refresh token (`grant_type=refresh_token`).
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status, or unparsable body
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError>;

    /// Get the configured redirect URI
    fn redirect_uri(&self) -> &str;
}

/// Error type for credential storage backends
#[derive(Debug)]
pub enum CredentialStoreError {
    /// Backend could not be reached or refused the operation
    Backend(String),

    /// Stored data could not be decoded
    Corrupted(String),
}

impl std::fmt::Display for CredentialStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "Credential store unavailable: {msg}"),
            Self::Corrupted(msg) => write!(f, "Stored credentials are corrupted: {msg}"),
        }
    }
}

impl std::error::Error for CredentialStoreError {}

/// Durable storage for the three credential fields.
///
/// Writes and clears are all-or-nothing: after `save` every field is
/// present, after `clear` none is.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load persisted credentials; `Ok(None)` when nothing (or only a
    /// partial set) is stored.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    async fn load(&self) -> Result<Option<PersistedCredentials>, CredentialStoreError>;

    /// Replace all three fields atomically.
    ///
    /// # Errors
    /// Returns error if the backend write fails; nothing is changed then
    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), CredentialStoreError>;

    /// Remove all three fields atomically (idempotent).
    ///
    /// # Errors
    /// Returns error if the backend delete fails
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}
