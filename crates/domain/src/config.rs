//! Configuration structures
//!
//! Every section has serde defaults so a config file only needs the Kakao
//! client id.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MARGIN_MM, DEFAULT_REDIRECT_URI, KAKAO_API_BASE_URL, KAKAO_AUTH_BASE_URL,
    KAKAO_DEFAULT_LINK_URL, KAKAO_SCOPE_TALK_MESSAGE, LOGIN_TIMEOUT_SECS, MIN_SKEW_BUFFER_SECS,
    POPUP_GRACE_PERIOD_MS, POPUP_HEIGHT, POPUP_POLL_INTERVAL_MS, POPUP_WIDTH,
};
use crate::errors::{Result, TalkReportError};
use crate::types::PageLayout;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub kakao: KakaoConfig,
    pub auth: AuthConfig,
    pub export: ExportConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// # Errors
    /// Returns `TalkReportError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.kakao.client_id.trim().is_empty() {
            return Err(TalkReportError::Config("kakao.client_id is required".to_string()));
        }
        if !self.kakao.redirect_uri.starts_with("http://")
            && !self.kakao.redirect_uri.starts_with("https://")
        {
            return Err(TalkReportError::Config(format!(
                "kakao.redirect_uri must be an http(s) URL, got {}",
                self.kakao.redirect_uri
            )));
        }
        if explicit_port(&self.kakao.redirect_uri) == Some(0) {
            return Err(TalkReportError::Config(
                "kakao.redirect_uri needs a fixed port; it must match the Kakao console entry"
                    .to_string(),
            ));
        }
        let layout = self.export.page_layout();
        if layout.content_width_mm() <= 0.0 || layout.content_height_mm() <= 0.0 {
            return Err(TalkReportError::Config(
                "export margins leave no printable area".to_string(),
            ));
        }
        Ok(())
    }
}

/// Port written in an `http(s)://host:port/...` URL, if any.
fn explicit_port(uri: &str) -> Option<u16> {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let port = match host_port.rsplit_once("]:") {
        Some((_, port)) => port,
        None if host_port.starts_with('[') => return None,
        None => host_port.rsplit_once(':')?.1,
    };
    port.parse().ok()
}

/// Kakao application registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KakaoConfig {
    /// REST API key of the Kakao application.
    pub client_id: String,
    /// Only needed when "client secret" is enabled in the Kakao console.
    pub client_secret: Option<String>,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub redirect_uri: String,
    pub scope: String,
    /// Link attached to every memo message.
    pub link_url: String,
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            auth_base_url: KAKAO_AUTH_BASE_URL.to_string(),
            api_base_url: KAKAO_API_BASE_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: KAKAO_SCOPE_TALK_MESSAGE.to_string(),
            link_url: KAKAO_DEFAULT_LINK_URL.to_string(),
        }
    }
}

/// Where OAuth credentials are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    #[default]
    Sqlite,
    Keychain,
}

/// Token lifecycle and login popup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Seconds subtracted from `expires_in`; values below 60 are raised to 60.
    pub skew_buffer_secs: u64,
    pub popup_width: u32,
    pub popup_height: u32,
    pub poll_interval_ms: u64,
    pub grace_period_ms: u64,
    pub login_timeout_secs: u64,
    pub credential_backend: CredentialBackend,
    /// Keychain service name when `credential_backend = "keychain"`.
    pub keychain_service: String,
}

impl AuthConfig {
    #[must_use]
    pub fn effective_skew_buffer_secs(&self) -> u64 {
        self.skew_buffer_secs.max(MIN_SKEW_BUFFER_SECS)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            skew_buffer_secs: MIN_SKEW_BUFFER_SECS,
            popup_width: POPUP_WIDTH,
            popup_height: POPUP_HEIGHT,
            poll_interval_ms: POPUP_POLL_INTERVAL_MS,
            grace_period_ms: POPUP_GRACE_PERIOD_MS,
            login_timeout_secs: LOGIN_TIMEOUT_SECS,
            credential_backend: CredentialBackend::Sqlite,
            keychain_service: "TalkReport.kakao".to_string(),
        }
    }
}

/// Document export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    /// Directory holding rendered report images, one `<element-id>.png` each.
    pub surface_dir: String,
    pub output_dir: String,
}

impl ExportConfig {
    #[must_use]
    pub fn page_layout(&self) -> PageLayout {
        PageLayout {
            page_width_mm: self.page_width_mm,
            page_height_mm: self.page_height_mm,
            margin_mm: self.margin_mm,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        let layout = PageLayout::a4(DEFAULT_MARGIN_MM);
        Self {
            page_width_mm: layout.page_width_mm,
            page_height_mm: layout.page_height_mm,
            margin_mm: layout.margin_mm,
            surface_dir: "renders".to_string(),
            output_dir: "exports".to_string(),
        }
    }
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { database_path: "talkreport.db".to_string() }
    }
}
