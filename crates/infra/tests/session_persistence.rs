//! Integration tests for SQLite-backed sessions
//!
//! Drives the real OAuth client against a mock token endpoint and persists
//! through a database file, reopening it to simulate an app restart.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use talkreport_common::auth::{CredentialStore, OAuthClient, TokenManager};
use talkreport_common::testing::MockClock;
use talkreport_domain::KakaoConfig;
use talkreport_infra::{oauth_config, DbManager, SqliteCredentialStore};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<OAuthClient> {
    let kakao = KakaoConfig {
        client_id: "rest-api-key".into(),
        auth_base_url: server.uri(),
        ..KakaoConfig::default()
    };
    Arc::new(OAuthClient::new(oauth_config(&kakao)))
}

fn manager(
    client: &Arc<OAuthClient>,
    db_path: &Path,
    clock: &MockClock,
) -> TokenManager<OAuthClient> {
    let db = Arc::new(DbManager::open(db_path).expect("database opens"));
    TokenManager::new(
        Arc::clone(client),
        Arc::new(SqliteCredentialStore::new(db)),
        Duration::from_secs(60),
    )
    .with_clock(Arc::new(clock.clone()))
}

async fn mount_exchange(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=rest-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "token_type": "bearer",
            "expires_in": expires_in
        })))
        .mount(server)
        .await;
}

/// Validates that a session survives an application restart.
///
/// # Test Steps
/// 1. Exchange a code; tokens land in the database file
/// 2. Reopen the file with a fresh manager and restore
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

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("talkreport.db");
    let client = client_for(&server);
    let clock = MockClock::new();

    let first = manager(&client, &db_path, &clock);
    let token = first.complete_authorization_code("code-1", client.redirect_uri()).await;
    assert_eq!(token.as_deref(), Some("A1"));
    drop(first);

    let second = manager(&client, &db_path, &clock);
    let restored = second.restore().await.unwrap().unwrap();
    assert_eq!(restored.access_token.as_deref(), Some("A1"));
    assert_eq!(restored.refresh_token.as_deref(), Some("R1"));
    assert_eq!(second.get_valid_access_token().await.as_deref(), Some("A1"));
}

/// Validates refresh on restart without a rotated refresh token.
///
/// # Test Steps
/// 1. Persist tokens, then move the clock past expiry
/// 2. Restore: the manager refreshes once and keeps `R1`
/// 3. The database holds the new access token and the old refresh token
#[tokio::test]
async fn test_expired_session_refreshes_on_restart() {
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

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("talkreport.db");
    let client = client_for(&server);
    let clock = MockClock::new();
    manager(&client, &db_path, &clock)
        .complete_authorization_code("code-1", client.redirect_uri())
        .await
        .unwrap();

    clock.advance(Duration::from_secs(7200));
    let restarted = manager(&client, &db_path, &clock);
    let restored = restarted.restore().await.unwrap().unwrap();
    assert_eq!(restored.access_token.as_deref(), Some("A2"));

    let db = Arc::new(DbManager::open(&db_path).unwrap());
    let persisted = SqliteCredentialStore::new(db).load().await.unwrap().unwrap();
    assert_eq!(persisted.access_token, "A2");
    assert_eq!(persisted.refresh_token.as_deref(), Some("R1"));
}

/// Validates that logout leaves nothing behind in the database.
#[tokio::test]
async fn test_logout_clears_database() {
    let server = MockServer::start().await;
    mount_exchange(&server, 21599).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("talkreport.db");
    let client = client_for(&server);
    let clock = MockClock::new();

    let session = manager(&client, &db_path, &clock);
    session.complete_authorization_code("code-1", client.redirect_uri()).await.unwrap();
    session.clear().await.unwrap();
    assert!(!session.is_authenticated().await);

    let restarted = manager(&client, &db_path, &clock);
    assert!(restarted.restore().await.unwrap().is_none());
}
