//! OAuth 2.0 types and structures
//!
//! Token state held by the [`TokenManager`](super::TokenManager), the wire
//! shapes of the provider's token endpoint, and the flat record written to a
//! [`CredentialStore`](super::CredentialStore).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default and minimum safety margin subtracted from `expires_in`.
pub const MIN_SKEW_BUFFER_MS: i64 = 60_000;

/// In-memory OAuth credentials.
///
/// `expires_at_epoch_ms` already has the skew buffer subtracted, so a token
/// counts as expired while the provider would still accept it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at_epoch_ms: Option<i64>,
}

impl TokenState {
    /// Build state from a token endpoint response.
    ///
    /// When the provider omits a new refresh token, `previous_refresh_token`
    /// is kept.
    #[must_use]
    pub fn from_response(
        response: &TokenResponse,
        previous_refresh_token: Option<String>,
        now_ms: i64,
        skew_buffer_ms: i64,
    ) -> Self {
        Self {
            access_token: Some(response.access_token.clone()),
            refresh_token: response.refresh_token.clone().or(previous_refresh_token),
            expires_at_epoch_ms: Some(
                now_ms + response.expires_in.saturating_mul(1000) - skew_buffer_ms,
            ),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    /// A token without a recorded expiry is treated as unexpired.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at_epoch_ms.is_some_and(|expires_at| now_ms >= expires_at)
    }

    /// Access token if present and unexpired at `now_ms`.
    #[must_use]
    pub fn valid_access_token(&self, now_ms: i64) -> Option<&str> {
        if self.is_expired_at(now_ms) {
            return None;
        }
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn seconds_until_expiry(&self, now_ms: i64) -> Option<i64> {
        self.expires_at_epoch_ms.map(|expires_at| (expires_at - now_ms).div_euclid(1000))
    }

    /// Flat record for persistence; `None` unless both the access token and
    /// its expiry are known.
    #[must_use]
    pub fn to_persisted(&self) -> Option<PersistedCredentials> {
        Some(PersistedCredentials {
            access_token: self.access_token.clone()?,
            refresh_token: self.refresh_token.clone(),
            expires_at_epoch_ms: self.expires_at_epoch_ms?,
        })
    }
}

/// The three persisted fields, always written and removed together.
///
/// A missing refresh token is stored as an empty value so the three keys stay
/// in lockstep.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_epoch_ms: i64,
}

impl fmt::Debug for PersistedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedCredentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at_epoch_ms", &self.expires_at_epoch_ms)
            .finish()
    }
}

impl From<PersistedCredentials> for TokenState {
    fn from(persisted: PersistedCredentials) -> Self {
        Self {
            access_token: Some(persisted.access_token),
            refresh_token: persisted.refresh_token.filter(|token| !token.is_empty()),
            expires_at_epoch_ms: Some(persisted.expires_at_epoch_ms),
        }
    }
}

/// OAuth token response from the authorization server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token_expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// OAuth client registration and endpoints
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            redirect_uri: redirect_uri.into(),
            scopes,
        }
    }

    #[must_use]
    pub fn with_client_secret(mut self, secret: Option<String>) -> Self {
        self.client_secret = secret.filter(|s| !s.is_empty());
        self
    }

    /// Get scopes as comma-separated string (Kakao's scope separator)
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(",")
    }
}

/// OAuth error response from the authorization server
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
    /// Kakao-specific error code such as `KOE320`.
    #[serde(default)]
    pub error_code: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
