//! Application context - dependency injection container

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use talkreport_common::auth::{
    AuthorizationFlow, CallbackMailbox, CredentialStore, KeychainCredentialStore, OAuthClient,
    TokenManager,
};
use talkreport_common::security::KeychainProvider;
use talkreport_core::{DeliveryHistory, DeliveryService, DocumentService};
use talkreport_domain::{AppConfig, CredentialBackend, Result};
use talkreport_infra::{
    flow_settings, oauth_config, BrowserConsentWindow, DbManager, ImageFileCapture,
    KakaoTalkClient, ReportRenderer, SqliteCredentialStore, SqliteDeliveryHistory,
};
use tracing::info;

/// Token manager wired to the real Kakao token endpoint.
pub type KakaoTokenManager = TokenManager<OAuthClient>;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<DbManager>,
    pub tokens: Arc<KakaoTokenManager>,
    pub login: Arc<AuthorizationFlow<OAuthClient>>,
    pub delivery: Arc<DeliveryService>,
    pub documents: Arc<DocumentService>,
    pub history: Arc<SqliteDeliveryHistory>,
}

impl AppContext {
    /// Load configuration and build the context.
    ///
    /// # Errors
    /// Returns `Config` when no usable configuration is found, or the error
    /// of the first component that fails to start.
    pub async fn new() -> Result<Self> {
        let config = talkreport_infra::config::load()?;
        Self::new_with_config(config).await
    }

    /// Build the context from an explicit configuration.
    ///
    /// # Errors
    /// Fails on an invalid configuration, an unusable database file or an
    /// unusable API base URL.
    pub async fn new_with_config(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::open(&config.storage.database_path)?);
        let store = credential_store(&config, &db);

        let client = Arc::new(OAuthClient::new(oauth_config(&config.kakao)));
        let skew = Duration::from_secs(config.auth.effective_skew_buffer_secs());
        let tokens = Arc::new(TokenManager::new(client, store, skew));

        let login = Arc::new(AuthorizationFlow::new(
            Arc::clone(&tokens),
            Arc::new(BrowserConsentWindow::new()),
            CallbackMailbox::default(),
            flow_settings(&config.auth),
        ));

        let history = Arc::new(SqliteDeliveryHistory::new(Arc::clone(&db)));
        let history_port: Arc<dyn DeliveryHistory> = history.clone();
        let sender = Arc::new(KakaoTalkClient::new(&config.kakao.api_base_url)?);
        let delivery = Arc::new(
            DeliveryService::new(tokens.clone(), sender)
                .with_history(history_port)
                .with_link_url(config.kakao.link_url.clone()),
        );

        let documents = Arc::new(
            DocumentService::new(
                Arc::new(ImageFileCapture::new(&config.export.surface_dir)),
                Arc::new(ReportRenderer::new()),
            )
            .with_layout(config.export.page_layout()),
        );

        info!(
            database = %config.storage.database_path,
            backend = ?config.auth.credential_backend,
            "Application context ready"
        );

        Ok(Self { config, db, tokens, login, delivery, documents, history })
    }

    /// Directory exported documents are written to by default.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.export.output_dir)
    }
}

fn credential_store(config: &AppConfig, db: &Arc<DbManager>) -> Arc<dyn CredentialStore> {
    match config.auth.credential_backend {
        CredentialBackend::Sqlite => Arc::new(SqliteCredentialStore::new(Arc::clone(db))),
        CredentialBackend::Keychain => Arc::new(KeychainCredentialStore::new(
            KeychainProvider::new(config.auth.keychain_service.clone()),
        )),
    }
}
