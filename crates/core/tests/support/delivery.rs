//! In-memory delivery ports.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use talkreport_core::delivery::{AccessTokenSource, DeliveryHistory, MessageSender, SendError};
use talkreport_core::TextMessage;
use talkreport_domain::{Result, SendHistoryEntry, TalkReportError};

/// Token source with a fixed answer.
#[derive(Default)]
pub struct StaticTokens {
    token: Mutex<Option<String>>,
    rejected: Mutex<Vec<String>>,
}

impl StaticTokens {
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())), rejected: Mutex::new(Vec::new()) }
    }

    pub fn invalidations(&self) -> usize {
        self.rejected.lock().len()
    }

    /// Tokens passed to `invalidate_access_token`, in order.
    pub fn rejected(&self) -> Vec<String> {
        self.rejected.lock().clone()
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokens {
    async fn valid_access_token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    async fn invalidate_access_token(&self, rejected: &str) {
        self.rejected.lock().push(rejected.to_string());
    }
}

/// Sender that replays scripted outcomes; success once the script runs out.
#[derive(Default)]
pub struct ScriptedSender {
    outcomes: Mutex<VecDeque<std::result::Result<(), SendError>>>,
    sent: Mutex<Vec<(String, TextMessage)>>,
}

impl ScriptedSender {
    pub fn push(&self, outcome: std::result::Result<(), SendError>) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn sent(&self) -> Vec<(String, TextMessage)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessageSender for ScriptedSender {
    async fn send_to_self(
        &self,
        access_token: &str,
        message: &TextMessage,
    ) -> std::result::Result<(), SendError> {
        self.sent.lock().push((access_token.to_string(), message.clone()));
        self.outcomes.lock().pop_front().unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<SendHistoryEntry>>,
    fail: bool,
}

impl MemoryHistory {
    pub fn failing() -> Self {
        Self { entries: Mutex::new(Vec::new()), fail: true }
    }

    pub fn entries(&self) -> Vec<SendHistoryEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl DeliveryHistory for MemoryHistory {
    async fn record(&self, entry: &SendHistoryEntry) -> Result<()> {
        if self.fail {
            return Err(TalkReportError::Database("disk full".into()));
        }
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SendHistoryEntry>> {
        Ok(self.entries.lock().iter().rev().take(limit).cloned().collect())
    }
}
