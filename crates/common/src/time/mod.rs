//! Time abstraction
//!
//! Token expiry is computed against an injected [`Clock`] so tests can move
//! wall time without sleeping.

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
