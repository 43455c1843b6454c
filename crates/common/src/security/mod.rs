//! Platform secret storage
//!
//! [`KeychainProvider`] wraps the OS keychain. Code that only needs to read
//! and write named secrets depends on [`SecretStore`] so tests can swap in
//! an in-memory store.

pub mod keychain;

pub use keychain::{KeychainError, KeychainProvider, SecretStore};
