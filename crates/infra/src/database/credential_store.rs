//! SQLite-backed OAuth credential store.
//!
//! The three credential fields live as separate rows of the `credentials`
//! table; `save` and `clear` touch all of them inside one transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection};
use talkreport_common::auth::{CredentialStore, CredentialStoreError, PersistedCredentials};
use talkreport_domain::constants::{KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_TOKEN_EXPIRY};
use talkreport_domain::TalkReportError;
use tokio::task;
use tracing::{debug, warn};

use super::manager::DbManager;
use super::map_join_error;

const CREDENTIAL_KEYS: [&str; 3] = [KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_TOKEN_EXPIRY];

/// [`CredentialStore`] over the application database.
pub struct SqliteCredentialStore {
    db: Arc<DbManager>,
}

impl SqliteCredentialStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, CredentialStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&DbManager) -> Result<T, TalkReportError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| CredentialStoreError::Backend(map_join_error(e).to_string()))?
            .map_err(|e| CredentialStoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn load(&self) -> Result<Option<PersistedCredentials>, CredentialStoreError> {
        let rows = self.blocking(|db| db.with_connection(|conn| read_rows(conn))).await?;
        Ok(decode_rows(rows))
    }

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), CredentialStoreError> {
        let values = [
            credentials.access_token.clone(),
            credentials.refresh_token.clone().unwrap_or_default(),
            credentials.expires_at_epoch_ms.to_string(),
        ];
        self.blocking(move |db| db.with_connection(|conn| write_rows(conn, &values))).await?;
        debug!("Saved credentials to sqlite");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.blocking(|db| db.with_connection(|conn| delete_rows(conn))).await?;
        debug!("Cleared credentials from sqlite");
        Ok(())
    }
}

/// Turn the raw rows into credentials. A partial or unreadable set is
/// treated as no session.
fn decode_rows(mut rows: HashMap<String, String>) -> Option<PersistedCredentials> {
    if rows.is_empty() {
        return None;
    }
    if rows.len() != CREDENTIAL_KEYS.len() {
        warn!(present = rows.len(), "Discarding partial credential set");
        return None;
    }

    let access_token = rows.remove(KEY_ACCESS_TOKEN)?;
    let refresh_token = rows.remove(KEY_REFRESH_TOKEN)?;
    let Ok(expires_at_epoch_ms) = rows.remove(KEY_TOKEN_EXPIRY)?.parse::<i64>() else {
        warn!("Discarding credentials with invalid expiry");
        return None;
    };

    Some(PersistedCredentials {
        access_token,
        refresh_token: Some(refresh_token).filter(|t| !t.is_empty()),
        expires_at_epoch_ms,
    })
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn read_rows(conn: &Connection) -> rusqlite::Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT key, value FROM credentials WHERE key IN (?1, ?2, ?3)")?;
    let rows = stmt.query_map(params![KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_TOKEN_EXPIRY], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    rows.collect()
}

fn write_rows(conn: &mut Connection, values: &[String; 3]) -> rusqlite::Result<()> {
    let now = chrono::Utc::now().timestamp();
    let tx = conn.transaction()?;
    for (key, value) in CREDENTIAL_KEYS.iter().zip(values) {
        tx.execute(
            "INSERT INTO credentials (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
    }
    tx.commit()
}

fn delete_rows(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM credentials WHERE key IN (?1, ?2, ?3)",
        params![KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_TOKEN_EXPIRY],
    )?;
    tx.commit()
}
