//! Application constants
//!
//! Provider endpoints and fixed values shared by the auth, export, and
//! delivery layers.

// Kakao endpoints
pub const KAKAO_AUTH_BASE_URL: &str = "https://kauth.kakao.com";
pub const KAKAO_API_BASE_URL: &str = "https://kapi.kakao.com";
pub const KAKAO_AUTHORIZE_PATH: &str = "/oauth/authorize";
pub const KAKAO_TOKEN_PATH: &str = "/oauth/token";
pub const KAKAO_MEMO_SEND_PATH: &str = "/v2/api/talk/memo/default/send";
pub const KAKAO_SCOPE_TALK_MESSAGE: &str = "talk_message";
pub const KAKAO_DEFAULT_LINK_URL: &str = "https://developers.kakao.com";

// Loopback callback
pub const CALLBACK_PATH: &str = "/kakao-callback";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8765/kakao-callback";

// Persisted credential keys (all three present or all three absent)
pub const KEY_ACCESS_TOKEN: &str = "kakao_access_token";
pub const KEY_REFRESH_TOKEN: &str = "kakao_refresh_token";
pub const KEY_TOKEN_EXPIRY: &str = "kakao_token_expiry";

// Token lifecycle
pub const MIN_SKEW_BUFFER_SECS: u64 = 60;

// Consent popup
pub const POPUP_WIDTH: u32 = 500;
pub const POPUP_HEIGHT: u32 = 600;
pub const POPUP_POLL_INTERVAL_MS: u64 = 500;
pub const POPUP_GRACE_PERIOD_MS: u64 = 500;
pub const LOGIN_TIMEOUT_SECS: u64 = 300;

// A4 portrait in millimetres
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
pub const DEFAULT_MARGIN_MM: f64 = 5.0;

/// Background the report card is rendered on; transparent pixels are
/// flattened onto it when encoding opaque page images.
pub const REPORT_BACKGROUND_RGB: [u8; 3] = [0xF8, 0xF9, 0xFA];

/// Recipient label for the self-memo channel.
pub const SELF_CHANNEL_LABEL: &str = "나에게 보내기";
