//! Application configuration
//!
//! `TALKREPORT_*` environment variables first, then a TOML or JSON file in
//! one of the probed locations.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
