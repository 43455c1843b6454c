//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TalkReport
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TalkReportError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Credential storage error: {0}")]
    Credentials(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TalkReportError {
    /// Short message suitable for showing to academy staff.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(_) | Self::Credentials(_) => "Please log in to KakaoTalk again.",
            Self::Network(_) => "Failed to send, please retry.",
            Self::Export(_) => "Export failed; use the manual print flow instead.",
            Self::Config(_) => "The application is not configured correctly.",
            Self::NotFound(_) | Self::InvalidInput(_) => "The request could not be completed.",
            Self::Database(_) | Self::Internal(_) => "An unexpected error occurred.",
        }
    }
}

/// Result type alias for TalkReport operations
pub type Result<T> = std::result::Result<T, TalkReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = TalkReportError::Auth("token expired".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Auth");
        assert_eq!(json["message"], "token expired");
    }

    #[test]
    fn user_messages_follow_error_class() {
        assert_eq!(
            TalkReportError::Auth("x".into()).user_message(),
            "Please log in to KakaoTalk again."
        );
        assert_eq!(TalkReportError::Network("x".into()).user_message(), "Failed to send, please retry.");
        assert!(TalkReportError::Export("x".into()).user_message().contains("manual print"));
    }
}
