//! Batch cycle-time reports.
//!
//! Orchestrates the provider and the engine over a list of issue keys:
//! sequential, order-preserving, with per-item failure isolation. The async
//! variant runs as a background task and logs progress to the job tracker.

use crate::api::{AccountId, CycleTime, CycleTimeEngine, IssueKey};
use crate::tracker::HistoryProvider;

use super::stats::{summarize_cycle_times, CycleTimeSummary};

use serde::{Deserialize, Serialize};

/// Parameters of one report computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub issue_keys: Vec<IssueKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<AccountId>,
}

/// A computed batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleTimeReport {
    pub cycle_times: Vec<CycleTime>,
    /// Summary over the items that produced an active-seconds value.
    pub summary: CycleTimeSummary,
}

/// Compute cycle times for a list of issue keys, in input order.
///
/// A provider failure on one key is recorded as an all-empty result for
/// that key and the batch continues; the engine itself is infallible.
pub async fn calculate_many(
    provider: &dyn HistoryProvider,
    engine: &CycleTimeEngine,
    issue_keys: &[IssueKey],
    worker: Option<&AccountId>,
) -> Vec<CycleTime> {
    let mut results = Vec::with_capacity(issue_keys.len());

    for issue_key in issue_keys {
        match provider.changelog(issue_key).await {
            Ok(histories) => {
                results.push(engine.calculate(&histories, issue_key, worker));
            }
            Err(e) => {
                log::warn!("failed to fetch changelog for {}: {}", issue_key, e);
                results.push(CycleTime::empty(issue_key.clone()));
            }
        }
    }

    results
}

/// Assemble a report from computed cycle times.
pub fn build_report(cycle_times: Vec<CycleTime>) -> CycleTimeReport {
    let seconds: Vec<f64> = cycle_times.iter().filter_map(|ct| ct.seconds).collect();
    let summary = summarize_cycle_times(&seconds);

    CycleTimeReport {
        cycle_times,
        summary,
    }
}

/// Fetch, calculate, and summarise in one call.
pub async fn compute_report(
    provider: &dyn HistoryProvider,
    engine: &CycleTimeEngine,
    request: &ReportRequest,
) -> CycleTimeReport {
    let cycle_times = calculate_many(
        provider,
        engine,
        &request.issue_keys,
        request.worker.as_ref(),
    )
    .await;
    build_report(cycle_times)
}

/// Process a report request asynchronously, recording per-issue progress.
///
/// Designed to be spawned as a background task; the registry feeds the SSE
/// stream while the batch runs and holds the typed report afterwards.
#[cfg(feature = "http-server")]
pub async fn process_report_async(
    job_id: String,
    jobs: super::report_jobs::ReportJobs,
    provider: std::sync::Arc<dyn HistoryProvider>,
    engine: CycleTimeEngine,
    request: ReportRequest,
) -> CycleTimeReport {
    let mut cycle_times = Vec::with_capacity(request.issue_keys.len());

    for issue_key in &request.issue_keys {
        match provider.changelog(issue_key).await {
            Ok(histories) => {
                cycle_times.push(engine.calculate(&histories, issue_key, request.worker.as_ref()));
                jobs.issue_computed(&job_id, issue_key);
            }
            Err(e) => {
                jobs.issue_failed(&job_id, issue_key, &e);
                cycle_times.push(CycleTime::empty(issue_key.clone()));
            }
        }
    }

    let report = build_report(cycle_times);
    jobs.complete(&job_id, report.clone());
    report
}
