//! Plain-text digest of a report for chat delivery.

use talkreport_domain::Report;

/// A text memo and the link attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub text: String,
    pub link_url: String,
}

impl TextMessage {
    #[must_use]
    pub fn for_report(report: &Report, link_url: impl Into<String>) -> Self {
        Self { text: build_digest(report), link_url: link_url.into() }
    }
}

/// Title line `"{name} - {year_month}"`, then one `"{subject}: {score}점"`
/// line per score.
#[must_use]
pub fn build_digest(report: &Report) -> String {
    let mut lines = Vec::with_capacity(report.scores.len() + 1);
    lines.push(format!("{} - {}", report.student_name, report.year_month));
    lines.extend(report.scores.iter().map(|s| format!("{}: {}점", s.subject, s.score)));
    lines.join("\n")
}
