//! OAuth 2.0 session management for a desktop client
//!
//! Covers the whole life of a Kakao login: opening the consent popup,
//! catching the redirect, exchanging the code, persisting the tokens, and
//! renewing them silently before each API call.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ AuthorizationFlow  │  Popup login (single-flight)
//! └─────────┬──────────┘
//!           │
//!           ├──► ConsentWindow      (opens the consent page)
//!           ├──► CallbackMailbox    (redirect results from the loopback page)
//!           └──► TokenManager       (token lifecycle + silent renewal)
//!                     │
//!                     ├──► OAuthClient       (token endpoint HTTP)
//!                     └──► CredentialStore   (durable storage)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use talkreport_common::auth::{
//!     KeychainCredentialStore, OAuthClient, OAuthConfig, TokenManager,
//! };
//! use talkreport_common::security::KeychainProvider;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::new(
//!     "rest-api-key",
//!     "https://kauth.kakao.com/oauth/authorize",
//!     "https://kauth.kakao.com/oauth/token",
//!     "http://localhost:8765/kakao-callback",
//!     vec!["talk_message".to_string()],
//! );
//! let store = KeychainCredentialStore::new(KeychainProvider::new("TalkReport.kakao"));
//! let manager =
//!     TokenManager::new(Arc::new(OAuthClient::new(config)), Arc::new(store), Duration::from_secs(60));
//!
//! manager.restore().await?;
//! if let Some(token) = manager.get_valid_access_token().await {
//!     println!("ready to send with {} chars of token", token.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: token state, persisted credentials, provider config
//! - **[`client`]**: token endpoint HTTP client
//! - **[`token_manager`]**: token lifecycle with lazy refresh
//! - **[`flow`]**: popup login coordinator
//! - **[`mailbox`]**: redirect result delivery
//! - **[`state`]**: CSRF `state` parameter helpers

pub mod client;
pub mod flow;
mod keychain;
pub mod mailbox;
pub mod state;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use flow::{
    AttemptPhase, AuthorizationFlow, ConsentWindow, FlowSettings, LoginError, PopupHandle,
    PopupRequest, ScreenRect,
};
pub use keychain::{KeychainCredentialStore, CREDENTIALS_ACCOUNT};
pub use mailbox::{CallbackListener, CallbackMailbox, CallbackMessage};
pub use state::{generate_state, validate_state};
pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::{CredentialStore, CredentialStoreError, OAuthClientTrait};
pub use types::{
    OAuthConfig, OAuthError, PersistedCredentials, TokenResponse, TokenState, MIN_SKEW_BUFFER_MS,
};
