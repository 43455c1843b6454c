//! Translation of application config into auth-layer settings.

use std::time::Duration;

use talkreport_common::auth::{FlowSettings, OAuthConfig};
use talkreport_domain::constants::{KAKAO_AUTHORIZE_PATH, KAKAO_TOKEN_PATH};
use talkreport_domain::{AuthConfig, KakaoConfig};

/// OAuth registration for the Kakao application in `kakao`.
#[must_use]
pub fn oauth_config(kakao: &KakaoConfig) -> OAuthConfig {
    let base = kakao.auth_base_url.trim_end_matches('/');
    let scopes = kakao
        .scope
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    OAuthConfig::new(
        kakao.client_id.clone(),
        format!("{base}{KAKAO_AUTHORIZE_PATH}"),
        format!("{base}{KAKAO_TOKEN_PATH}"),
        kakao.redirect_uri.clone(),
        scopes,
    )
    .with_client_secret(kakao.client_secret.clone())
}

/// Popup geometry and timing for the login coordinator.
#[must_use]
pub fn flow_settings(auth: &AuthConfig) -> FlowSettings {
    FlowSettings {
        popup_width: auth.popup_width,
        popup_height: auth.popup_height,
        poll_interval: Duration::from_millis(auth.poll_interval_ms),
        grace_period: Duration::from_millis(auth.grace_period_ms),
        login_timeout: Duration::from_secs(auth.login_timeout_secs),
        ..FlowSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_auth_base_url() {
        let kakao = KakaoConfig {
            client_id: "rest-key".into(),
            auth_base_url: "http://127.0.0.1:9999/".into(),
            scope: "talk_message, profile_nickname".into(),
            client_secret: Some(String::new()),
            ..KakaoConfig::default()
        };

        let config = oauth_config(&kakao);
        assert_eq!(config.authorization_endpoint, "http://127.0.0.1:9999/oauth/authorize");
        assert_eq!(config.token_endpoint, "http://127.0.0.1:9999/oauth/token");
        assert_eq!(config.scopes, vec!["talk_message", "profile_nickname"]);
        assert_eq!(config.client_secret, None);
        assert_eq!(config.redirect_uri, "http://localhost:8765/kakao-callback");
    }

    #[test]
    fn default_flow_settings_match_auth_defaults() {
        assert_eq!(flow_settings(&AuthConfig::default()), FlowSettings::default());
    }
}
