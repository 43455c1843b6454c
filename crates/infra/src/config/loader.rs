//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the client id is not in the environment, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `TALKREPORT_KAKAO_CLIENT_ID`: Kakao REST API key (required)
//! - `TALKREPORT_KAKAO_CLIENT_SECRET`: client secret, if enabled in the console
//! - `TALKREPORT_KAKAO_REDIRECT_URI`: loopback redirect URI
//! - `TALKREPORT_KAKAO_AUTH_BASE_URL` / `TALKREPORT_KAKAO_API_BASE_URL`
//! - `TALKREPORT_KAKAO_LINK_URL`: link attached to every memo
//! - `TALKREPORT_SKEW_BUFFER_SECS`: token expiry skew (floored at 60)
//! - `TALKREPORT_LOGIN_TIMEOUT_SECS`: overall popup login deadline
//! - `TALKREPORT_CREDENTIAL_BACKEND`: `sqlite` or `keychain`
//! - `TALKREPORT_DB_PATH`: SQLite database file
//! - `TALKREPORT_EXPORT_MARGIN_MM`: page margin for PDF export
//! - `TALKREPORT_SURFACE_DIR` / `TALKREPORT_OUTPUT_DIR`: export directories
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./talkreport.toml`, `./talkreport.json`, `./config.toml`,
//!    `./config.json` (current working directory)
//! 2. The same names one directory up
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use talkreport_domain::{AppConfig, CredentialBackend, Result, TalkReportError};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["talkreport.toml", "talkreport.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// client id is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `TalkReportError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<AppConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `TALKREPORT_KAKAO_CLIENT_ID` is required; every other variable
/// overrides the corresponding default.
///
/// # Errors
/// Returns `TalkReportError::Config` if the client id is missing or a
/// variable has an invalid value.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();
    config.kakao.client_id = env_var("TALKREPORT_KAKAO_CLIENT_ID")?;

    config.kakao.client_secret = env_opt("TALKREPORT_KAKAO_CLIENT_SECRET");
    if let Some(uri) = env_opt("TALKREPORT_KAKAO_REDIRECT_URI") {
        config.kakao.redirect_uri = uri;
    }
    if let Some(url) = env_opt("TALKREPORT_KAKAO_AUTH_BASE_URL") {
        config.kakao.auth_base_url = url;
    }
    if let Some(url) = env_opt("TALKREPORT_KAKAO_API_BASE_URL") {
        config.kakao.api_base_url = url;
    }
    if let Some(url) = env_opt("TALKREPORT_KAKAO_LINK_URL") {
        config.kakao.link_url = url;
    }

    if let Some(secs) = env_parse::<u64>("TALKREPORT_SKEW_BUFFER_SECS")? {
        config.auth.skew_buffer_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>("TALKREPORT_LOGIN_TIMEOUT_SECS")? {
        config.auth.login_timeout_secs = secs;
    }
    if let Some(backend) = env_opt("TALKREPORT_CREDENTIAL_BACKEND") {
        config.auth.credential_backend = parse_backend(&backend)?;
    }

    if let Some(path) = env_opt("TALKREPORT_DB_PATH") {
        config.storage.database_path = path;
    }
    if let Some(margin) = env_parse::<f64>("TALKREPORT_EXPORT_MARGIN_MM")? {
        config.export.margin_mm = margin;
    }
    if let Some(dir) = env_opt("TALKREPORT_SURFACE_DIR") {
        config.export.surface_dir = dir;
    }
    if let Some(dir) = env_opt("TALKREPORT_OUTPUT_DIR") {
        config.export.output_dir = dir;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TalkReportError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TalkReportError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TalkReportError::Config(
                "No config file found and TALKREPORT_KAKAO_CLIENT_ID is not set".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TalkReportError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TalkReportError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TalkReportError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(TalkReportError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn parse_backend(value: &str) -> Result<CredentialBackend> {
    match value.to_ascii_lowercase().as_str() {
        "sqlite" => Ok(CredentialBackend::Sqlite),
        "keychain" => Ok(CredentialBackend::Keychain),
        other => Err(TalkReportError::Config(format!(
            "Invalid credential backend '{other}' (expected sqlite or keychain)"
        ))),
    }
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        TalkReportError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty environment variable, if set.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| TalkReportError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
