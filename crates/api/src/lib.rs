//! # TalkReport App
//!
//! Application layer - commands and the CLI entry point.
//!
//! This crate contains:
//! - Commands (session, delivery, export)
//! - Application context (dependency injection)
//! - Logging setup shared by the binary
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
