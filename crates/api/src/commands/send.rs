//! Delivery commands

use std::path::Path;

use serde::Deserialize;
use talkreport_domain::{
    BulkDeliverySummary, DeliveryChannel, DeliveryResult, Report, Result, SendHistoryEntry,
    TalkReportError,
};
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

#[derive(Deserialize)]
#[serde(untagged)]
enum ReportFile {
    Many(Vec<Report>),
    One(Box<Report>),
}

/// Read reports from a JSON file holding one report or an array of them.
///
/// # Errors
/// Returns `NotFound` for a missing file and `InvalidInput` for JSON that
/// is not a report.
pub async fn load_reports(path: &Path) -> Result<Vec<Report>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => {
            TalkReportError::NotFound(format!("report file {}", path.display()))
        }
        _ => TalkReportError::InvalidInput(format!("cannot read {}: {err}", path.display())),
    })?;

    let parsed: ReportFile = serde_json::from_str(&raw).map_err(|err| {
        TalkReportError::InvalidInput(format!("{} is not a report file: {err}", path.display()))
    })?;
    Ok(match parsed {
        ReportFile::Many(reports) => reports,
        ReportFile::One(report) => vec![*report],
    })
}

/// Send one report digest to the signed-in user's own chat.
pub async fn send_report(ctx: &AppContext, report: &Report) -> DeliveryResult {
    let result = ctx.delivery.deliver(report, DeliveryChannel::SelfMemo).await;
    info!(
        command = "send::one",
        success = result.success,
        requires_login = result.requires_login(),
        "command_execution_finished"
    );
    result
}

/// Send every report in order; failures are counted, not fatal.
pub async fn bulk_send(ctx: &AppContext, reports: &[Report]) -> BulkDeliverySummary {
    let summary = ctx.delivery.deliver_many(reports, DeliveryChannel::SelfMemo).await;
    info!(
        command = "send::bulk",
        total = reports.len(),
        succeeded = summary.succeeded,
        failed = summary.failed,
        "command_execution_finished"
    );
    summary
}

/// Recorded attempts, newest first, optionally for one student.
///
/// # Errors
/// Returns `Database` when the history table cannot be read.
pub async fn send_history(
    ctx: &AppContext,
    limit: usize,
    student_id: Option<&str>,
) -> Result<Vec<SendHistoryEntry>> {
    execute_logged("send::history", || async {
        match student_id {
            Some(student_id) => ctx.history.for_student(student_id, limit).await,
            None => ctx.delivery.history(limit).await,
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const REPORT: &str = r#"{
        "studentId": "s-1",
        "studentName": "김민수",
        "yearMonth": "2024-03",
        "scores": [{"subject": "국어", "score": 95}]
    }"#;

    #[tokio::test]
    async fn loads_single_report_and_arrays() {
        let dir = TempDir::new().unwrap();
        let one = dir.path().join("one.json");
        let many = dir.path().join("many.json");
        std::fs::write(&one, REPORT).unwrap();
        std::fs::write(&many, format!("[{REPORT}, {REPORT}]")).unwrap();

        let single = load_reports(&one).await.unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].student_name, "김민수");
        assert_eq!(load_reports(&many).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let missing = load_reports(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(missing, TalkReportError::NotFound(_)));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"hello": "world"}"#).unwrap();
        let err = load_reports(&bad).await.unwrap_err();
        assert!(matches!(err, TalkReportError::InvalidInput(_)));
    }
}
