//! Delivery outcomes and send history records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::SELF_CHANNEL_LABEL;
use crate::impl_domain_status_conversions;
use crate::types::report::Report;

/// Where a report digest is delivered. Only the signed-in user's own chat
/// ("send to me") is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    #[default]
    SelfMemo,
}

impl DeliveryChannel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SelfMemo => SELF_CHANNEL_LABEL,
        }
    }

    #[must_use]
    pub fn recipient_kind(self) -> RecipientKind {
        match self {
            Self::SelfMemo => RecipientKind::Myself,
        }
    }
}

/// Why a delivery failed. Callers use it to decide whether to re-run login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryFailure {
    /// No usable token was available; nothing was sent.
    NotAuthenticated,
    /// The provider rejected the bearer token.
    Unauthorized,
    /// The provider answered with a non-2xx status other than 401.
    Rejected { status: u16 },
    /// The request never produced a response.
    Network,
}

impl DeliveryFailure {
    #[must_use]
    pub fn requires_login(self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::Unauthorized)
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub success: bool,
    pub recipient_label: String,
    /// RFC 3339 timestamp of the attempt.
    pub sent_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<DeliveryFailure>,
}

impl DeliveryResult {
    #[must_use]
    pub fn succeeded(channel: DeliveryChannel, sent_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            recipient_label: channel.label().to_string(),
            sent_at: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            error_message: None,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(
        channel: DeliveryChannel,
        sent_at: DateTime<Utc>,
        failure: DeliveryFailure,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            recipient_label: channel.label().to_string(),
            sent_at: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            error_message: Some(error_message.into()),
            failure: Some(failure),
        }
    }

    #[must_use]
    pub fn requires_login(&self) -> bool {
        self.failure.is_some_and(DeliveryFailure::requires_login)
    }
}

/// Per-report results of a sequential bulk send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeliverySummary {
    pub results: Vec<DeliveryResult>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkDeliverySummary {
    pub fn push(&mut self, result: DeliveryResult) {
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    #[serde(rename = "self")]
    Myself,
}

impl_domain_status_conversions!(RecipientKind {
    Myself => "self",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Success,
    Failed,
}

impl_domain_status_conversions!(SendStatus {
    Success => "success",
    Failed => "failed",
});

/// A persisted record of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendHistoryEntry {
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    /// `student_id:year_month` of the report that was sent.
    pub report_key: String,
    pub recipient_label: String,
    pub recipient_kind: RecipientKind,
    pub sent_at: DateTime<Utc>,
    pub status: SendStatus,
    pub error_message: Option<String>,
}

impl SendHistoryEntry {
    #[must_use]
    pub fn from_result(
        report: &Report,
        channel: DeliveryChannel,
        result: &DeliveryResult,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            student_id: report.student_id.clone(),
            student_name: report.student_name.clone(),
            report_key: format!("{}:{}", report.student_id, report.year_month),
            recipient_label: result.recipient_label.clone(),
            recipient_kind: channel.recipient_kind(),
            sent_at,
            status: if result.success { SendStatus::Success } else { SendStatus::Failed },
            error_message: result.error_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn failed_result_carries_classification() {
        let result = DeliveryResult::failed(
            DeliveryChannel::SelfMemo,
            at(),
            DeliveryFailure::NotAuthenticated,
            "not authenticated",
        );
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("not authenticated"));
        assert!(result.requires_login());
        assert_eq!(result.sent_at, "2024-03-15T09:30:00.000Z");
    }

    #[test]
    fn rejected_failure_does_not_require_login() {
        let result = DeliveryResult::failed(
            DeliveryChannel::SelfMemo,
            at(),
            DeliveryFailure::Rejected { status: 500 },
            "HTTP 500",
        );
        assert!(!result.requires_login());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["failure"]["kind"], "rejected");
        assert_eq!(json["failure"]["status"], 500);
    }

    #[test]
    fn bulk_summary_counts_outcomes() {
        let mut summary = BulkDeliverySummary::default();
        summary.push(DeliveryResult::succeeded(DeliveryChannel::SelfMemo, at()));
        summary.push(DeliveryResult::failed(
            DeliveryChannel::SelfMemo,
            at(),
            DeliveryFailure::Network,
            "timeout",
        ));
        summary.push(DeliveryResult::succeeded(DeliveryChannel::SelfMemo, at()));
        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert_eq!(summary.results.len(), 3);
    }

    #[test]
    fn history_entry_mirrors_result() {
        let report = Report {
            student_id: "s-7".into(),
            student_name: "이서연".into(),
            year_month: "2024-03".into(),
            scores: vec![],
            total_comment: None,
        };
        let result = DeliveryResult::succeeded(DeliveryChannel::SelfMemo, at());
        let entry = SendHistoryEntry::from_result(&report, DeliveryChannel::SelfMemo, &result, at());
        assert_eq!(entry.report_key, "s-7:2024-03");
        assert_eq!(entry.recipient_kind, RecipientKind::Myself);
        assert_eq!(entry.status, SendStatus::Success);
        assert_eq!(entry.recipient_kind.to_string(), "self");
    }

    #[test]
    fn recipient_kind_only_knows_self() {
        assert_eq!("SELF".parse::<RecipientKind>(), Ok(RecipientKind::Myself));
        assert!("parent".parse::<RecipientKind>().is_err());
        assert_eq!(serde_json::to_string(&RecipientKind::Myself).unwrap(), "\"self\"");
    }
}
