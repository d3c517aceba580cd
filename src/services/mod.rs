//! Service layer for business logic and orchestration.
//!
//! Services sit between the tracker access layer and the HTTP surface:
//! batch report computation, summary statistics, and the registry of
//! background report jobs.

pub mod report;

pub mod stats;

#[cfg(feature = "http-server")]
pub mod report_jobs;

pub use report::{build_report, calculate_many, compute_report, CycleTimeReport, ReportRequest};
pub use stats::{percentile, summarize_cycle_times, CycleTimeSummary};
