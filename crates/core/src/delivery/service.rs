//! Delivery service - core business logic
//!
//! Every call ends in a [`DeliveryResult`]; failures are data, not errors.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use talkreport_common::time::{Clock, SystemClock};
use talkreport_domain::constants::KAKAO_DEFAULT_LINK_URL;
use talkreport_domain::{
    BulkDeliverySummary, DeliveryChannel, DeliveryFailure, DeliveryResult, Report,
    SendHistoryEntry,
};
use tracing::{info, warn};

use super::digest::TextMessage;
use super::ports::{AccessTokenSource, DeliveryHistory, MessageSender, SendError};

/// Error message for a send attempted without a usable token.
pub const NOT_AUTHENTICATED: &str = "not authenticated";

/// Sends report digests and records the outcome.
pub struct DeliveryService {
    tokens: Arc<dyn AccessTokenSource>,
    sender: Arc<dyn MessageSender>,
    history: Option<Arc<dyn DeliveryHistory>>,
    clock: Arc<dyn Clock>,
    link_url: String,
}

impl DeliveryService {
    pub fn new(tokens: Arc<dyn AccessTokenSource>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            tokens,
            sender,
            history: None,
            clock: Arc::new(SystemClock),
            link_url: KAKAO_DEFAULT_LINK_URL.to_string(),
        }
    }

    pub fn with_history(mut self, history: Arc<dyn DeliveryHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_link_url(mut self, link_url: impl Into<String>) -> Self {
        self.link_url = link_url.into();
        self
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.clock.system_time())
    }

    /// Send one report's digest over `channel`.
    ///
    /// Never starts a login. Only a rejected token invalidates the cached
    /// token; transport errors and other statuses leave it alone.
    pub async fn deliver(&self, report: &Report, channel: DeliveryChannel) -> DeliveryResult {
        let sent_at = self.now();
        let result = self.attempt(report, channel, sent_at).await;

        if let Some(history) = &self.history {
            let entry = SendHistoryEntry::from_result(report, channel, &result, sent_at);
            if let Err(e) = history.record(&entry).await {
                warn!(error = %e, student_id = %report.student_id, "Failed to record send history");
            }
        }
        result
    }

    async fn attempt(
        &self,
        report: &Report,
        channel: DeliveryChannel,
        sent_at: DateTime<Utc>,
    ) -> DeliveryResult {
        let Some(token) = self.tokens.valid_access_token().await else {
            info!(student_id = %report.student_id, "Delivery skipped, not authenticated");
            return DeliveryResult::failed(
                channel,
                sent_at,
                DeliveryFailure::NotAuthenticated,
                NOT_AUTHENTICATED,
            );
        };

        let message = TextMessage::for_report(report, self.link_url.clone());
        let outcome = match channel {
            DeliveryChannel::SelfMemo => self.sender.send_to_self(&token, &message).await,
        };

        match outcome {
            Ok(()) => {
                info!(student_id = %report.student_id, channel = channel.label(), "Report delivered");
                DeliveryResult::succeeded(channel, sent_at)
            }
            Err(err) => {
                warn!(student_id = %report.student_id, error = %err, "Report delivery failed");
                let failure = match &err {
                    SendError::Unauthorized { .. } => {
                        self.tokens.invalidate_access_token(&token).await;
                        DeliveryFailure::Unauthorized
                    }
                    SendError::Rejected { status, .. } => {
                        DeliveryFailure::Rejected { status: *status }
                    }
                    SendError::Transport(_) => DeliveryFailure::Network,
                };
                DeliveryResult::failed(channel, sent_at, failure, err.to_string())
            }
        }
    }

    /// Send each report in turn; one failure does not stop the rest.
    pub async fn deliver_many(
        &self,
        reports: &[Report],
        channel: DeliveryChannel,
    ) -> BulkDeliverySummary {
        let mut summary = BulkDeliverySummary::default();
        for report in reports {
            summary.push(self.deliver(report, channel).await);
        }
        info!(succeeded = summary.succeeded, failed = summary.failed, "Bulk delivery finished");
        summary
    }

    /// Recorded attempts, newest first; empty without a history port.
    pub async fn history(&self, limit: usize) -> talkreport_domain::Result<Vec<SendHistoryEntry>> {
        match &self.history {
            Some(history) => history.recent(limit).await,
            None => Ok(Vec::new()),
        }
    }
}
