//! Send history persisted in SQLite.
//!
//! All database operations run in `spawn_blocking` to avoid blocking the
//! async runtime.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use talkreport_core::DeliveryHistory;
use talkreport_domain::{RecipientKind, Result, SendHistoryEntry, SendStatus};
use tokio::task;
use uuid::Uuid;

use super::manager::DbManager;
use super::map_join_error;

/// SQLite-backed [`DeliveryHistory`].
pub struct SqliteDeliveryHistory {
    db: Arc<DbManager>,
}

impl SqliteDeliveryHistory {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// History of one student, most recent first.
    pub async fn for_student(&self, student_id: &str, limit: usize) -> Result<Vec<SendHistoryEntry>> {
        let db = Arc::clone(&self.db);
        let student_id = student_id.to_string();

        task::spawn_blocking(move || {
            db.with_connection(|conn| query_for_student(conn, &student_id, limit))
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl DeliveryHistory for SqliteDeliveryHistory {
    async fn record(&self, entry: &SendHistoryEntry) -> Result<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || db.with_connection(|conn| insert_entry(conn, &entry)))
            .await
            .map_err(map_join_error)?
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SendHistoryEntry>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || db.with_connection(|conn| query_recent(conn, limit)))
            .await
            .map_err(map_join_error)?
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, student_id, student_name, report_key, recipient_label,
        recipient_kind, sent_at, status, error_message
     FROM send_history";

fn insert_entry(conn: &Connection, entry: &SendHistoryEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO send_history (id, student_id, student_name, report_key, recipient_label,
            recipient_kind, sent_at, status, error_message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.id.to_string(),
            entry.student_id,
            entry.student_name,
            entry.report_key,
            entry.recipient_label,
            entry.recipient_kind.to_string(),
            entry.sent_at.timestamp_millis(),
            entry.status.to_string(),
            entry.error_message,
        ],
    )?;
    Ok(())
}

fn query_recent(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<SendHistoryEntry>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY sent_at DESC, rowid DESC LIMIT ?1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![sql_limit(limit)], map_entry)?;
    rows.collect()
}

fn query_for_student(
    conn: &Connection,
    student_id: &str,
    limit: usize,
) -> rusqlite::Result<Vec<SendHistoryEntry>> {
    let sql =
        format!("{SELECT_COLUMNS} WHERE student_id = ?1 ORDER BY sent_at DESC, rowid DESC LIMIT ?2");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![student_id, sql_limit(limit)], map_entry)?;
    rows.collect()
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<SendHistoryEntry> {
    let id: String = row.get(0)?;
    let recipient_kind: String = row.get(5)?;
    let sent_at_ms: i64 = row.get(6)?;
    let status: String = row.get(7)?;

    Ok(SendHistoryEntry {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        student_id: row.get(1)?,
        student_name: row.get(2)?,
        report_key: row.get(3)?,
        recipient_label: row.get(4)?,
        recipient_kind: recipient_kind.parse::<RecipientKind>().map_err(|e| conversion_error(5, e))?,
        sent_at: millis_to_datetime(sent_at_ms).ok_or_else(|| {
            conversion_error(6, format!("timestamp {sent_at_ms} out of range"))
        })?,
        status: status.parse::<SendStatus>().map_err(|e| conversion_error(7, e))?,
        error_message: row.get(8)?,
    })
}

fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

fn conversion_error(
    column: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}
