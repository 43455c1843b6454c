//! Monthly report supplied by the record-keeping layer.

use serde::{Deserialize, Serialize};

/// One subject line of a monthly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub subject: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A student's report for one month (`year_month` is `YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub student_id: String,
    pub student_name: String,
    pub year_month: String,
    #[serde(default)]
    pub scores: Vec<SubjectScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_comment: Option<String>,
}

impl Report {
    /// Average over all subject scores, `None` for an empty report.
    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let sum: f64 = self.scores.iter().map(|s| s.score).sum();
        Some(sum / self.scores.len() as f64)
    }
}
