//! Testing utilities and helpers
//!
//! - **[`mocks`]**: in-memory implementations of the auth and security traits
//!
//! ```rust
//! use talkreport_common::testing::MockClock;
//!
//! let clock = MockClock::new();
//! clock.advance(std::time::Duration::from_secs(5));
//! ```

pub mod mocks;

pub use mocks::{
    MockConsentWindow, MockCredentialStore, MockKeychainProvider, MockOAuthClient,
    MockPopupHandle,
};

pub use crate::time::{Clock, MockClock, SystemClock};
