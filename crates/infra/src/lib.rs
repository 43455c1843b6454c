//! # TalkReport Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite persistence (credentials, send history)
//! - HTTP client and the Kakao REST integrations
//! - The loopback OAuth callback server and browser consent window
//! - PDF/PNG encoding and surface capture for document export
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `talkreport-core` and `talkreport-common`
//! - Contains all "impure" code (I/O, network, filesystem)

pub mod config;
pub mod database;
pub mod errors;
pub mod export;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use database::{DbManager, SqliteCredentialStore, SqliteDeliveryHistory};
pub use errors::InfraError;
pub use export::{ImageFileCapture, ReportRenderer};
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::kakao::{
    flow_settings, oauth_config, BrowserConsentWindow, KakaoCallbackServer, KakaoTalkClient,
};
