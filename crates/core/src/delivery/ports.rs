//! Port interfaces for report delivery

use async_trait::async_trait;
use talkreport_common::auth::{OAuthClientTrait, TokenManager};
use talkreport_domain::{Result, SendHistoryEntry};
use thiserror::Error;

use super::digest::TextMessage;

/// Source of bearer tokens for the send endpoint.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// A token safe to use now, or `None` if the user has to log in.
    async fn valid_access_token(&self) -> Option<String>;

    /// Forget that `rejected` is valid, unless it was already replaced.
    async fn invalidate_access_token(&self, rejected: &str);
}

#[async_trait]
impl<C: OAuthClientTrait + 'static> AccessTokenSource for TokenManager<C> {
    async fn valid_access_token(&self) -> Option<String> {
        self.get_valid_access_token().await
    }

    async fn invalidate_access_token(&self, rejected: &str) {
        TokenManager::invalidate_access_token(self, rejected).await;
    }
}

/// Why the provider did not accept a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The provider rejected the token itself (401 / invalid token).
    #[error("access token rejected: {body}")]
    Unauthorized { body: String },

    #[error("send rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// No answer from the provider.
    #[error("send failed: {0}")]
    Transport(String),
}

/// Provider endpoint that posts a memo to the user's own chat.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_to_self(
        &self,
        access_token: &str,
        message: &TextMessage,
    ) -> std::result::Result<(), SendError>;
}

/// Durable log of delivery attempts.
#[async_trait]
pub trait DeliveryHistory: Send + Sync {
    async fn record(&self, entry: &SendHistoryEntry) -> Result<()>;

    /// Most recent entries first.
    async fn recent(&self, limit: usize) -> Result<Vec<SendHistoryEntry>>;
}
