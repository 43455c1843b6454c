//! Shared building blocks for the TalkReport crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: async infrastructure and the injectable clock
//! - `platform`: OAuth session management and keychain access
//! - `test-utils`: in-memory mocks for the platform traits

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;
#[cfg(feature = "platform")]
pub mod security;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "platform")))]
pub mod testing;

#[cfg(feature = "platform")]
pub use security::{KeychainError, KeychainProvider, SecretStore};
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock};
