//! OAuth 2.0 authorization-code client
//!
//! Handles the provider side of the login:
//! - Consent page URL building
//! - Authorization code exchange
//! - Token refresh
//!
//! Both grants POST form-encoded bodies to the token endpoint. Any non-2xx
//! answer becomes an error; the caller decides what that means.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, OAuthError, TokenResponse};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed
    RequestFailed(reqwest::Error),

    /// OAuth server returned an error body
    OAuthError { status: u16, error: OAuthError },

    /// Non-2xx response without a recognizable error body
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse response
    ParseError(String),

    /// No refresh token available
    NoRefreshToken,
}

impl OAuthClientError {
    /// HTTP status returned by the token endpoint, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OAuthError { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            Self::ParseError(_) | Self::NoRefreshToken => None,
        }
    }
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::OAuthError { status, error } => write!(f, "OAuth error ({status}): {error}"),
            Self::UnexpectedStatus { status, body } => {
                write!(f, "Token endpoint returned {status}: {body}")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::NoRefreshToken => write!(f, "No refresh token available"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.0 client for a confidential-or-public authorization-code app
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Examples
    /// ```
    /// use talkreport_common::auth::{OAuthClient, OAuthConfig};
    ///
    /// let config = OAuthConfig::new(
    ///     "rest-api-key",
    ///     "https://kauth.kakao.com/oauth/authorize",
    ///     "https://kauth.kakao.com/oauth/token",
    ///     "http://localhost:8765/kakao-callback",
    ///     vec!["talk_message".to_string()],
    /// );
    /// let client = OAuthClient::new(config);
    /// ```
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    /// Build the consent page URL
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let scope = self.config.scope_string();
        let params = [
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_endpoint, query_string)
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the request fails, the server answers non-2xx, or the
    /// body cannot be parsed
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", redirect_uri.to_string()),
            ("code", code.to_string()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.clone()));
        }

        debug!("Exchanging authorization code");
        self.post_token_request(&params).await
    }

    /// Refresh the access token
    ///
    /// # Errors
    /// Returns `NoRefreshToken` for an empty token, otherwise as
    /// [`exchange_code`](Self::exchange_code)
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let mut params = vec![
            ("grant_type", "refresh_token".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("refresh_token", refresh_token.to_string()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.clone()));
        }

        debug!("Refreshing access token");
        self.post_token_request(&params).await
    }

    async fn post_token_request(
        &self,
        params: &[(&str, String)],
    ) -> Result<TokenResponse, OAuthClientError> {
        let response = self.client.post(&self.config.token_endpoint).form(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Token endpoint rejected request");
            return Err(match serde_json::from_str::<OAuthError>(&body) {
                Ok(error) => OAuthClientError::OAuthError { status: status.as_u16(), error },
                Err(_) => OAuthClientError::UnexpectedStatus { status: status.as_u16(), body },
            });
        }

        response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        self.authorization_url(state)
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_code(code, redirect_uri).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError> {
        self.refresh(refresh_token).await
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uri()
    }
}
