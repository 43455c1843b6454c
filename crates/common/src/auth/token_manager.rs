//! Token manager with silent renewal
//!
//! Manages the OAuth token lifecycle:
//! - Restore from the credential store at startup (refreshing if stale)
//! - Authorization code exchange after the consent popup
//! - Lazy refresh when a caller asks for a token that has expired
//! - Logout and forced invalidation after a provider 401
//!
//! Network failures and non-2xx answers are treated the same way: the caller
//! sees "not authenticated". There is no retry loop here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::traits::{CredentialStore, CredentialStoreError, OAuthClientTrait};
use super::types::{TokenState, MIN_SKEW_BUFFER_MS};
use crate::time::{Clock, SystemClock};

/// Error type for token manager operations
#[derive(Debug)]
pub enum TokenManagerError {
    /// Credential store read or write failed
    Store(CredentialStoreError),
}

impl std::fmt::Display for TokenManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "Credential store error: {e}"),
        }
    }
}

impl std::error::Error for TokenManagerError {}

impl From<CredentialStoreError> for TokenManagerError {
    fn from(err: CredentialStoreError) -> Self {
        Self::Store(err)
    }
}

/// Owns the in-memory [`TokenState`] and mirrors it into a
/// [`CredentialStore`].
///
/// Refreshes are serialized: a caller that waited on an in-flight refresh
/// re-checks expiry and reuses its result.
pub struct TokenManager<C: OAuthClientTrait + 'static> {
    oauth_client: Arc<C>,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    state: RwLock<TokenState>,
    refresh_lock: Mutex<()>,
    skew_buffer_ms: i64,
}

impl<C: OAuthClientTrait + 'static> TokenManager<C> {
    /// Create a new token manager
    ///
    /// `skew_buffer` below 60 seconds is raised to 60 seconds.
    #[must_use]
    pub fn new(oauth_client: Arc<C>, store: Arc<dyn CredentialStore>, skew_buffer: Duration) -> Self {
        let skew_buffer_ms =
            i64::try_from(skew_buffer.as_millis()).unwrap_or(i64::MAX).max(MIN_SKEW_BUFFER_MS);
        Self {
            oauth_client,
            store,
            clock: Arc::new(SystemClock),
            state: RwLock::new(TokenState::default()),
            refresh_lock: Mutex::new(()),
            skew_buffer_ms,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn oauth_client(&self) -> &Arc<C> {
        &self.oauth_client
    }

    fn now_ms(&self) -> i64 {
        self.clock.millis_since_epoch()
    }

    /// Load persisted credentials into memory.
    ///
    /// An expired token with a refresh token is renewed before returning. If
    /// that renewal fails every field is cleared and `Ok(None)` is returned.
    ///
    /// # Errors
    /// Returns error only when the credential store itself fails
    pub async fn restore(&self) -> Result<Option<TokenState>, TokenManagerError> {
        let Some(persisted) = self.store.load().await? else {
            debug!("No persisted credentials found");
            *self.state.write().await = TokenState::default();
            return Ok(None);
        };

        let restored = TokenState::from(persisted);
        let needs_refresh =
            restored.is_expired_at(self.now_ms()) && restored.refresh_token.is_some();
        *self.state.write().await = restored;

        if needs_refresh {
            info!("Persisted access token expired, refreshing");
            if !self.refresh().await {
                warn!("Refresh during restore failed, clearing credentials");
                self.clear().await?;
                return Ok(None);
            }
        }

        info!("Token manager restored persisted credentials");
        Ok(Some(self.state.read().await.clone()))
    }

    /// Access token that is safe to send right now.
    ///
    /// Returns the cached token while unexpired; otherwise attempts exactly
    /// one refresh. `None` means the caller has to log in.
    pub async fn get_valid_access_token(&self) -> Option<String> {
        if let Some(token) = self.unexpired_access_token().await {
            return Some(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // A concurrent caller may have refreshed while we waited.
        if let Some(token) = self.unexpired_access_token().await {
            return Some(token);
        }

        if self.refresh_locked().await {
            self.state.read().await.access_token.clone()
        } else {
            None
        }
    }

    async fn unexpired_access_token(&self) -> Option<String> {
        let now = self.now_ms();
        self.state.read().await.valid_access_token(now).map(str::to_string)
    }

    /// Exchange a one-time authorization code for tokens and persist them.
    ///
    /// Returns `None` without touching state when the exchange or the write
    /// to the credential store fails.
    pub async fn complete_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Option<String> {
        let response = match self.oauth_client.exchange_code(code, redirect_uri).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Authorization code exchange failed");
                return None;
            }
        };

        let next = TokenState::from_response(&response, None, self.now_ms(), self.skew_buffer_ms);
        if let Err(e) = self.persist(&next).await {
            warn!(error = %e, "Failed to persist exchanged tokens");
            return None;
        }

        let access_token = next.access_token.clone();
        *self.state.write().await = next;
        info!(expires_in = response.expires_in, "Authorization code exchanged");
        access_token
    }

    /// Renew the access token with the stored refresh token.
    ///
    /// Returns `false` and leaves state untouched on any failure.
    pub async fn refresh(&self) -> bool {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> bool {
        let Some(refresh_token) = self.state.read().await.refresh_token.clone() else {
            debug!("No refresh token available");
            return false;
        };

        let response = match self.oauth_client.refresh(&refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                return false;
            }
        };

        let rotated = response.refresh_token.is_some();
        let next = TokenState::from_response(
            &response,
            Some(refresh_token),
            self.now_ms(),
            self.skew_buffer_ms,
        );
        if let Err(e) = self.persist(&next).await {
            warn!(error = %e, "Failed to persist refreshed tokens");
            return false;
        }

        *self.state.write().await = next;
        info!(rotated_refresh_token = rotated, "Successfully refreshed access token");
        true
    }

    /// Wipe memory and all persisted fields (logout).
    ///
    /// Waits for an in-flight refresh, so its result cannot be written back
    /// after the wipe.
    ///
    /// # Errors
    /// Returns error if the credential store delete fails; memory is wiped
    /// regardless
    pub async fn clear(&self) -> Result<(), TokenManagerError> {
        let _guard = self.refresh_lock.lock().await;
        *self.state.write().await = TokenState::default();
        self.store.clear().await?;
        info!("Tokens cleared (logged out)");
        Ok(())
    }

    /// Mark `rejected` expired so the next
    /// [`get_valid_access_token`](Self::get_valid_access_token) renews it.
    ///
    /// A no-op when the cached token is no longer `rejected`, e.g. after a
    /// concurrent refresh already replaced it.
    pub async fn invalidate_access_token(&self, rejected: &str) {
        let _guard = self.refresh_lock.lock().await;
        let now = self.now_ms();
        let snapshot = {
            let mut state = self.state.write().await;
            if state.access_token.as_deref() != Some(rejected) {
                debug!("Rejected token already replaced, nothing to invalidate");
                return;
            }
            state.expires_at_epoch_ms = Some(now);
            state.clone()
        };

        if let Err(e) = self.persist(&snapshot).await {
            warn!(error = %e, "Failed to persist invalidated token");
        }
        info!("Access token invalidated");
    }

    async fn persist(&self, state: &TokenState) -> Result<(), CredentialStoreError> {
        match state.to_persisted() {
            Some(credentials) => self.store.save(&credentials).await,
            None => Ok(()),
        }
    }

    /// Whether an access token is held (expired or not).
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    /// Seconds until the cached token counts as expired.
    pub async fn seconds_until_expiry(&self) -> Option<i64> {
        let now = self.now_ms();
        self.state.read().await.seconds_until_expiry(now)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> TokenState {
        self.state.read().await.clone()
    }

    #[must_use]
    pub fn skew_buffer_ms(&self) -> i64 {
        self.skew_buffer_ms
    }
}
