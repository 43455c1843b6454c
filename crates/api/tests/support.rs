#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use talkreport_common::auth::{CredentialStore, PersistedCredentials};
use talkreport_domain::AppConfig;
use talkreport_infra::SqliteCredentialStore;
use talkreport_lib::AppContext;
use tempfile::TempDir;

/// A context whose database, renders and exports live in a temp dir.
pub struct TestApp {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestApp {
    /// `provider` replaces both Kakao base URLs, e.g. a wiremock server.
    pub async fn new(provider: Option<String>) -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        let ctx = AppContext::new_with_config(config_in(&dir, provider))
            .await
            .expect("context should build");
        Self { ctx, dir }
    }

    pub fn surface_dir(&self) -> PathBuf {
        self.dir.path().join("renders")
    }

    /// Store a session as if a login had completed earlier.
    pub async fn seed_session(&self, access: &str, refresh: &str, expires_in_ms: i64) {
        let store = SqliteCredentialStore::new(Arc::clone(&self.ctx.db));
        store
            .save(&PersistedCredentials {
                access_token: access.into(),
                refresh_token: Some(refresh.into()),
                expires_at_epoch_ms: now_ms() + expires_in_ms,
            })
            .await
            .expect("credentials should be stored");
    }

    /// Save an opaque `width`x`height` render as `<renders>/<id>.png`.
    pub fn save_render(&self, id: &str, width: u32, height: u32) {
        std::fs::create_dir_all(self.surface_dir()).expect("render dir should be created");
        image::RgbaImage::from_pixel(width, height, image::Rgba([30, 60, 90, 255]))
            .save(self.surface_dir().join(format!("{id}.png")))
            .expect("render should be saved");
    }
}

pub fn config_in(dir: &TempDir, provider: Option<String>) -> AppConfig {
    let mut config = AppConfig::default();
    config.kakao.client_id = "rest-api-key".into();
    config.kakao.link_url = "https://academy.example.com".into();
    if let Some(base) = provider {
        config.kakao.auth_base_url = base.clone();
        config.kakao.api_base_url = base;
    }
    config.storage.database_path = dir.path().join("talkreport.db").to_string_lossy().into_owned();
    config.export.surface_dir = dir.path().join("renders").to_string_lossy().into_owned();
    config.export.output_dir = dir.path().join("exports").to_string_lossy().into_owned();
    config
}

pub fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("clock after epoch").as_millis() as i64
}
