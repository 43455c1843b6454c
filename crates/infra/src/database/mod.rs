//! Database implementations

pub mod credential_store;
pub mod history_repository;
pub mod manager;

pub use credential_store::SqliteCredentialStore;
pub use history_repository::SqliteDeliveryHistory;
pub use manager::DbManager;

use talkreport_domain::TalkReportError;
use tokio::task::JoinError;

pub(crate) fn map_join_error(err: JoinError) -> TalkReportError {
    if err.is_cancelled() {
        TalkReportError::Internal("blocking database task cancelled".into())
    } else {
        TalkReportError::Internal(format!("blocking database task failed: {err}"))
    }
}
