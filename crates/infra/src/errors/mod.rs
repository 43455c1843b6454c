//! Boundary conversions into [`talkreport_domain::TalkReportError`].

mod conversions;

pub use conversions::InfraError;
