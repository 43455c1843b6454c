//! # TalkReport Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Page slicing for document export
//! - The report delivery pipeline
//! - Port interfaces (traits) implemented by `talkreport-infra`
//!
//! ## Architecture Principles
//! - Depends only on `talkreport-common` and `talkreport-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod delivery;
pub mod document;

pub use delivery::{
    AccessTokenSource, DeliveryHistory, DeliveryService, MessageSender, SendError, TextMessage,
};
pub use document::{
    paginate, DocumentRenderer, DocumentService, ExportedDocument, PaginationError,
    SurfaceCapture,
};
