//! Single-connection SQLite manager.
//!
//! The desktop app is the only writer, so one connection behind a mutex is
//! enough. Callers on the async runtime reach it through `spawn_blocking`.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use talkreport_domain::{Result, TalkReportError};
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Database manager that owns the application's SQLite connection.
pub struct DbManager {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl DbManager {
    /// Open (or create) the database at `db_path` and apply the schema.
    ///
    /// # Errors
    /// Returns `TalkReportError::Database` if the file cannot be opened or
    /// the schema cannot be applied.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                TalkReportError::Database(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(&path).map_err(map_sql_error)?;
        conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(map_sql_error)?;

        let manager = Self { conn: Mutex::new(conn), path };
        manager.run_migrations()?;

        info!(db_path = %manager.path.display(), "sqlite database opened");
        Ok(manager)
    }

    /// In-memory database, used by tests and dry runs.
    ///
    /// # Errors
    /// Returns `TalkReportError::Database` if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_sql_error)?;
        let manager = Self { conn: Mutex::new(conn), path: PathBuf::from(":memory:") };
        manager.run_migrations()?;
        Ok(manager)
    }

    /// Run `f` with exclusive access to the connection.
    ///
    /// # Errors
    /// Propagates the closure's `rusqlite` error as a domain error.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock();
        f(&mut conn).map_err(map_sql_error)
    }

    /// Ensure the full schema exists on the current database.
    ///
    /// # Errors
    /// Returns `TalkReportError::Database` on SQL failure.
    pub fn run_migrations(&self) -> Result<()> {
        self.with_connection(|conn| create_schema(conn))
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database is accessible and responding.
    ///
    /// # Errors
    /// Returns `TalkReportError::Database` if the probe query fails.
    pub fn health_check(&self) -> Result<()> {
        self.with_connection(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0)))?;
        Ok(())
    }
}

fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> TalkReportError {
    TalkReportError::from(InfraError::from(err))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn migrations_create_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("nested").join("talkreport.db");

        let manager = DbManager::open(&db_path).expect("manager created");
        manager.run_migrations().expect("migrations are idempotent");

        let version: i32 = manager
            .with_connection(|conn| {
                conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            })
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert!(db_path.exists());
        assert_eq!(manager.path(), db_path.as_path());
    }

    #[test]
    fn health_check_succeeds_in_memory() {
        let manager = DbManager::open_in_memory().unwrap();
        manager.health_check().unwrap();
    }

    #[test]
    fn opening_a_non_database_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("garbage.db");
        std::fs::write(&db_path, vec![0x42; 4096]).unwrap();

        let err = DbManager::open(&db_path).err().unwrap();
        assert!(matches!(err, TalkReportError::Database(_)));
    }
}
