//! Mock implementations of common traits
//!
//! Provides in-memory stand-ins for the OAuth provider, the credential
//! store, the keychain, and the consent popup.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{
    ConsentWindow, CredentialStore, CredentialStoreError, OAuthClientError, OAuthClientTrait,
    PersistedCredentials, PopupHandle, PopupRequest, TokenResponse,
};
use crate::security::{KeychainError, SecretStore};

type StorageData = Arc<Mutex<HashMap<String, String>>>;

/// Mock keychain provider that stores secrets in memory.
///
/// Clones share storage, so a test can keep one handle for inspection.
#[derive(Clone, Debug)]
pub struct MockKeychainProvider {
    storage: StorageData,
    service_name: String,
}

impl MockKeychainProvider {
    /// Create a new mock keychain provider with a service name for namespacing.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { storage: Arc::new(Mutex::new(HashMap::new())), service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.lock().is_empty()
    }
}

impl Default for MockKeychainProvider {
    fn default() -> Self {
        Self::new("talkreport-test")
    }
}

impl SecretStore for MockKeychainProvider {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        self.storage.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        self.storage.lock().get(key).cloned().ok_or(KeychainError::NotFound)
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        self.storage.lock().remove(key);
        Ok(())
    }
}

/// In-memory [`CredentialStore`].
#[derive(Debug, Default)]
pub struct MockCredentialStore {
    stored: Mutex<Option<PersistedCredentials>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently stored credentials.
    pub fn snapshot(&self) -> Option<PersistedCredentials> {
        self.stored.lock().clone()
    }

    /// Pre-populate the store as if a previous run had saved `credentials`.
    pub fn seed(&self, credentials: PersistedCredentials) {
        *self.stored.lock() = Some(credentials);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn load(&self) -> Result<Option<PersistedCredentials>, CredentialStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CredentialStoreError::Backend("mock read failure".into()));
        }
        Ok(self.snapshot())
    }

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), CredentialStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CredentialStoreError::Backend("mock write failure".into()));
        }
        *self.stored.lock() = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CredentialStoreError::Backend("mock write failure".into()));
        }
        *self.stored.lock() = None;
        Ok(())
    }
}

/// Scripted OAuth provider.
///
/// The exchange answer is fixed; refresh answers are consumed in order and an
/// empty queue means the provider rejects the refresh token.
#[derive(Debug)]
pub struct MockOAuthClient {
    redirect_uri: String,
    exchange_response: Mutex<Option<TokenResponse>>,
    refresh_responses: Mutex<VecDeque<TokenResponse>>,
    refresh_delay: Mutex<Option<Duration>>,
    last_refresh_token: Mutex<Option<String>>,
    exchange_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl MockOAuthClient {
    pub fn new() -> Self {
        Self {
            redirect_uri: "http://localhost:8765/kakao-callback".to_string(),
            exchange_response: Mutex::new(None),
            refresh_responses: Mutex::new(VecDeque::new()),
            refresh_delay: Mutex::new(None),
            last_refresh_token: Mutex::new(None),
            exchange_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Token endpoint answer with the given fields.
    pub fn token(access: &str, refresh: Option<&str>, expires_in: i64) -> TokenResponse {
        TokenResponse {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            token_type: Some("bearer".to_string()),
            expires_in,
            refresh_token_expires_in: refresh.map(|_| 5_183_999),
            scope: Some("talk_message".to_string()),
        }
    }

    pub fn set_exchange_response(&self, response: TokenResponse) {
        *self.exchange_response.lock() = Some(response);
    }

    pub fn fail_exchange(&self) {
        *self.exchange_response.lock() = None;
    }

    pub fn push_refresh_response(&self, response: TokenResponse) {
        self.refresh_responses.lock().push_back(response);
    }

    /// Delay every refresh answer by `delay`.
    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock() = Some(delay);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().clone()
    }

    fn rejection() -> OAuthClientError {
        OAuthClientError::UnexpectedStatus { status: 401, body: "mock rejection".into() }
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "https://kauth.mock.test/oauth/authorize?response_type=code&client_id=test&state={}",
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.exchange_response.lock().clone().ok_or_else(Self::rejection)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock() = Some(refresh_token.to_string());

        let delay = *self.refresh_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.refresh_responses.lock().pop_front().ok_or_else(Self::rejection)
    }

    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

/// Popup opened by [`MockConsentWindow`].
#[derive(Debug, Clone, Default)]
pub struct MockPopupHandle {
    closed: Arc<AtomicBool>,
    closed_by_app: Arc<AtomicBool>,
}

impl MockPopupHandle {
    /// Simulate the user closing the window.
    pub fn close_by_user(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the login flow closed the window itself.
    pub fn closed_by_app(&self) -> bool {
        self.closed_by_app.load(Ordering::SeqCst)
    }
}

impl PopupHandle for MockPopupHandle {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed_by_app.store(true, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Consent window that records requests instead of showing anything.
#[derive(Debug, Default)]
pub struct MockConsentWindow {
    blocked: AtomicBool,
    requests: Mutex<Vec<PopupRequest>>,
    handles: Mutex<Vec<MockPopupHandle>>,
}

impl MockConsentWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave like a popup blocker: every `open` fails.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn opened_requests(&self) -> Vec<PopupRequest> {
        self.requests.lock().clone()
    }

    /// Handle of the most recently opened popup.
    pub fn last_popup(&self) -> Option<MockPopupHandle> {
        self.handles.lock().last().cloned()
    }

    /// Simulate the user closing the most recent popup.
    pub fn close_popup(&self) {
        if let Some(handle) = self.last_popup() {
            handle.close_by_user();
        }
    }

    /// `state` query parameter of the most recent consent URL.
    pub fn last_state(&self) -> Option<String> {
        let request = self.requests.lock().last().cloned()?;
        let url = url::Url::parse(&request.url).ok()?;
        url.query_pairs().find(|(k, _)| k == "state").map(|(_, v)| v.into_owned())
    }
}

impl ConsentWindow for MockConsentWindow {
    fn open(&self, request: &PopupRequest) -> Option<Box<dyn PopupHandle>> {
        self.requests.lock().push(request.clone());
        if self.blocked.load(Ordering::SeqCst) {
            return None;
        }
        let handle = MockPopupHandle::default();
        self.handles.lock().push(handle.clone());
        Some(Box::new(handle))
    }
}
