//! Domain data types

pub mod delivery;
pub mod document;
pub mod report;

pub use delivery::{
    BulkDeliverySummary, DeliveryChannel, DeliveryFailure, DeliveryResult, RecipientKind,
    SendHistoryEntry, SendStatus,
};
pub use document::{PageLayout, PageSlice, RenderedSurface};
pub use report::{Report, SubjectScore};
