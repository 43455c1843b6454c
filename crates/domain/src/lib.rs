//! # TalkReport Domain
//!
//! Business domain types for TalkReport.
//!
//! This crate contains:
//! - Report and delivery records exchanged with the surrounding CRUD layer
//! - Raster surface and page slice types used by document export
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other TalkReport crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
