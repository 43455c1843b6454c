//! Integration tests for auth module
//!
//! Drives the real OAuth HTTP client against a mock token endpoint and
//! persists through the keychain-backed credential store.

#![cfg(feature = "platform")]

use std::sync::Arc;
use std::time::Duration;

use talkreport_common::auth::{
    generate_state, validate_state, CredentialStore, KeychainCredentialStore, OAuthClient,
    OAuthConfig, TokenManager,
};
use talkreport_common::testing::{MockClock, MockKeychainProvider};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<OAuthClient> {
    let config = OAuthConfig::new(
        "rest-api-key",
        format!("{}/oauth/authorize", server.uri()),
        format!("{}/oauth/token", server.uri()),
        "http://localhost:8765/kakao-callback",
        vec!["talk_message".to_string()],
    );
    Arc::new(OAuthClient::new(config))
}

fn manager(
    client: &Arc<OAuthClient>,
    secrets: &MockKeychainProvider,
    clock: &MockClock,
) -> TokenManager<OAuthClient> {
    let store = KeychainCredentialStore::new(secrets.clone());
    TokenManager::new(Arc::clone(client), Arc::new(store), Duration::from_secs(60))
        .with_clock(Arc::new(clock.clone()))
}

async fn mount_exchange(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "token_type": "bearer",
            "expires_in": expires_in
        })))
        .mount(server)
        .await;
}

/// Validates OAuth state parameter generation and validation for CSRF
/// protection.
///
/// # Test Steps
/// 1. Generate two state values
/// 2. Verify they differ and are URL-safe
/// 3. Verify only an exact match validates
#[test]
fn test_state_generation_and_validation() {
    let state1 = generate_state();
    let state2 = generate_state();

    assert_ne!(state1, state2);
    assert!(state1.len() >= 32);
    assert!(state1.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    assert!(validate_state(&state1, Some(&state1)));
    assert!(!validate_state(&state1, Some(&state2)));
    assert!(!validate_state(&state1, None));
}

/// Validates that a session survives an application restart.
///
/// # Test Steps
/// 1. Exchange a code through the HTTP client; tokens land in the keychain
/// 2. Build a second manager over the same keychain and restore
/// 3. Verify the restored token is usable with no refresh request
#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    mount_exchange(&server, 21599).await;
    Mock::given(method("POST"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let secrets = MockKeychainProvider::default();
    let clock = MockClock::new();

    let first = manager(&client, &secrets, &clock);
    let token = first.complete_authorization_code("code-1", client.redirect_uri()).await;
    assert_eq!(token.as_deref(), Some("A1"));
    drop(first);

    let second = manager(&client, &secrets, &clock);
    let restored = second.restore().await.unwrap().unwrap();
    assert_eq!(restored.access_token.as_deref(), Some("A1"));
    assert_eq!(second.get_valid_access_token().await.as_deref(), Some("A1"));
}

/// Validates restart after the access token expired.
///
/// # Test Steps
/// 1. Persist tokens, then move the clock past expiry
/// 2. Restore: the manager refreshes and keeps the unrotated refresh token
#[tokio::test]
async fn test_restart_with_expired_token_refreshes() {
    let server = MockServer::start().await;
    mount_exchange(&server, 3600).await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "A2",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let secrets = MockKeychainProvider::default();
    let clock = MockClock::new();
    manager(&client, &secrets, &clock)
        .complete_authorization_code("code-1", client.redirect_uri())
        .await
        .unwrap();

    clock.advance(Duration::from_secs(7200));
    let restarted = manager(&client, &secrets, &clock);
    let restored = restarted.restore().await.unwrap().unwrap();

    assert_eq!(restored.access_token.as_deref(), Some("A2"));
    assert_eq!(restored.refresh_token.as_deref(), Some("R1"));
    let persisted = KeychainCredentialStore::new(secrets).load().await.unwrap().unwrap();
    assert_eq!(persisted.access_token, "A2");
    assert_eq!(persisted.refresh_token.as_deref(), Some("R1"));
}

/// Validates that a rejected refresh during restore ends the session.
///
/// # Test Steps
/// 1. Persist tokens and expire them
/// 2. Token endpoint answers 401 to the refresh
/// 3. Verify the manager and the keychain are both empty
#[tokio::test]
async fn test_rejected_refresh_on_restart_logs_out() {
    let server = MockServer::start().await;
    mount_exchange(&server, 3600).await;
    Mock::given(method("POST"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "refresh token expired"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let secrets = MockKeychainProvider::default();
    let clock = MockClock::new();
    manager(&client, &secrets, &clock)
        .complete_authorization_code("code-1", client.redirect_uri())
        .await
        .unwrap();

    clock.advance(Duration::from_secs(7200));
    let restarted = manager(&client, &secrets, &clock);

    assert!(restarted.restore().await.unwrap().is_none());
    assert!(!restarted.is_authenticated().await);
    assert!(secrets.is_empty());
}
