//! Background report jobs.
//!
//! Batch reports run as spawned tasks. This registry tracks each batch while
//! it walks its key list: per-issue progress counters, a streamable event
//! feed, and the finished [`CycleTimeReport`] once the batch completes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::IssueKey;

use super::report::CycleTimeReport;

/// Lifecycle of a report job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportJobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Warning,
    Error,
}

/// One progress line, suitable for streaming to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub at: DateTime<Utc>,
    pub level: ProgressLevel,
    pub message: String,
}

/// Counters for a batch in flight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReportProgress {
    /// Issue keys in the batch.
    pub issues_total: usize,
    /// Keys processed so far, failed fetches included.
    pub issues_done: usize,
    /// Keys whose changelog could not be fetched.
    pub fetch_failures: usize,
}

/// A tracked report job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportJob {
    pub job_id: String,
    pub status: ReportJobStatus,
    pub progress: ReportProgress,
    pub events: Vec<ProgressEvent>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// The computed report, present once the job completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CycleTimeReport>,
}

/// Shared in-memory registry of report jobs.
#[derive(Clone, Default)]
pub struct ReportJobs {
    jobs: Arc<RwLock<HashMap<String, ReportJob>>>,
}

impl ReportJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running job for a batch of `issues_total` keys and return
    /// its id.
    pub fn create(&self, issues_total: usize) -> String {
        let job_id = Uuid::new_v4().to_string();
        let job = ReportJob {
            job_id: job_id.clone(),
            status: ReportJobStatus::Running,
            progress: ReportProgress {
                issues_total,
                ..Default::default()
            },
            events: vec![ProgressEvent {
                at: Utc::now(),
                level: ProgressLevel::Info,
                message: format!("Computing cycle times for {} issues...", issues_total),
            }],
            created_at: Utc::now(),
            finished_at: None,
            report: None,
        };
        self.jobs.write().insert(job_id.clone(), job);
        job_id
    }

    /// Record one computed issue.
    pub fn issue_computed(&self, job_id: &str, issue_key: &IssueKey) {
        self.update(job_id, |job| {
            job.progress.issues_done += 1;
            push_progress_line(job, ProgressLevel::Info, format!("{} computed", issue_key));
        });
    }

    /// Record one issue whose changelog fetch failed. The batch continues;
    /// the failure only shows up in the counters and the event feed.
    pub fn issue_failed(&self, job_id: &str, issue_key: &IssueKey, error: impl std::fmt::Display) {
        self.update(job_id, |job| {
            job.progress.issues_done += 1;
            job.progress.fetch_failures += 1;
            push_progress_line(
                job,
                ProgressLevel::Warning,
                format!("{} failed: {}", issue_key, error),
            );
        });
    }

    /// Finish a job with its computed report.
    pub fn complete(&self, job_id: &str, report: CycleTimeReport) {
        self.update(job_id, |job| {
            job.events.push(ProgressEvent {
                at: Utc::now(),
                level: ProgressLevel::Info,
                message: format!(
                    "Report complete: {} issues, {} with cycle time, {} fetch failures",
                    job.progress.issues_total,
                    report.summary.count,
                    job.progress.fetch_failures
                ),
            });
            job.status = ReportJobStatus::Completed;
            job.finished_at = Some(Utc::now());
            job.report = Some(report);
        });
    }

    /// Mark a job as failed outright.
    pub fn fail(&self, job_id: &str, message: impl Into<String>) {
        self.update(job_id, |job| {
            job.events.push(ProgressEvent {
                at: Utc::now(),
                level: ProgressLevel::Error,
                message: message.into(),
            });
            job.status = ReportJobStatus::Failed;
            job.finished_at = Some(Utc::now());
        });
    }

    pub fn get(&self, job_id: &str) -> Option<ReportJob> {
        self.jobs.read().get(job_id).cloned()
    }

    pub fn events(&self, job_id: &str) -> Vec<ProgressEvent> {
        self.jobs
            .read()
            .get(job_id)
            .map(|job| job.events.clone())
            .unwrap_or_default()
    }

    fn update(&self, job_id: &str, apply: impl FnOnce(&mut ReportJob)) {
        if let Some(job) = self.jobs.write().get_mut(job_id) {
            apply(job);
        }
    }
}

fn push_progress_line(job: &mut ReportJob, level: ProgressLevel, message: String) {
    let done = job.progress.issues_done;
    let total = job.progress.issues_total;
    job.events.push(ProgressEvent {
        at: Utc::now(),
        level,
        message: format!("[{}/{}] {}", done, total, message),
    });
}
