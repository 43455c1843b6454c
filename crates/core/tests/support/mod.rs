//! Shared test helpers for `talkreport-core` integration tests.
//!
//! Lightweight in-memory implementations of the core ports so tests can
//! focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod delivery;
pub mod document;

use talkreport_domain::{Report, SubjectScore};

pub fn sample_report(student_id: &str) -> Report {
    Report {
        student_id: student_id.to_string(),
        student_name: "김민수".to_string(),
        year_month: "2024-03".to_string(),
        scores: vec![
            SubjectScore { subject: "국어".into(), score: 95.0, comment: None },
            SubjectScore { subject: "수학".into(), score: 87.5, comment: None },
        ],
        total_comment: None,
    }
}
