//! Commands - the operations the CLI exposes
//!
//! Each command takes the [`AppContext`](crate::context::AppContext) and
//! returns serializable data, so a GUI shell can call the same functions.

pub mod auth;
pub mod export;
pub mod send;

pub use auth::{login, logout, restore_session, status, AuthStatus};
pub use export::{export_pdf, export_pdf_base64, export_png, ExportOutcome};
pub use send::{bulk_send, load_reports, send_history, send_report};
