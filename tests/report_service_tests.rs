//! Functional tests for the report service.
//!
//! These tests exercise the batch path from provider through engine to
//! summary, including per-item failure isolation and background job
//! processing.

mod common;

use common::*;

use cadence_rust::api::{AccountId, CycleTimeEngine, IssueKey};
use cadence_rust::services::{build_report, calculate_many, compute_report, ReportRequest};
use cadence_rust::tracker::{HistoryProvider, StaticHistoryProvider};

fn provider_with_two_issues() -> StaticHistoryProvider {
    StaticHistoryProvider::new()
        .with_history(
            "PROJ-1",
            vec![
                status_change(1, 10, "Backlog", "In Development"),
                status_change(3, 10, "In Development", "Done"),
            ],
        )
        .with_history(
            "PROJ-2",
            vec![
                status_change(2, 10, "Backlog", "In Development"),
                status_change(6, 10, "In Development", "Done"),
            ],
        )
}

fn engine() -> CycleTimeEngine {
    CycleTimeEngine::new(default_vocabulary())
}

#[tokio::test]
async fn test_batch_preserves_input_order() {
    let provider = provider_with_two_issues();
    let keys = vec![IssueKey::new("PROJ-2"), IssueKey::new("PROJ-1")];

    let results = calculate_many(&provider, &engine(), &keys, None).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].issue_key, keys[0]);
    assert_eq!(results[1].issue_key, keys[1]);
    assert_seconds_close(results[0].seconds.unwrap(), 4.0 * DAY_SECONDS);
    assert_seconds_close(results[1].seconds.unwrap(), 2.0 * DAY_SECONDS);
}

#[tokio::test]
async fn test_provider_failure_isolated_per_item() {
    let provider = provider_with_two_issues();
    let keys = vec![
        IssueKey::new("PROJ-1"),
        IssueKey::new("PROJ-404"),
        IssueKey::new("PROJ-2"),
    ];

    let results = calculate_many(&provider, &engine(), &keys, None).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].seconds.is_some());
    // The failed fetch becomes an empty record; the batch continues.
    assert!(results[1].seconds.is_none());
    assert!(results[1].in_progress_at.is_none());
    assert!(results[2].seconds.is_some());
}

#[tokio::test]
async fn test_worker_filter_threads_through_batch() {
    let provider = StaticHistoryProvider::new().with_history(
        "PROJ-9",
        vec![
            assignee_change(1, 9, None, Some(PERSON_A)),
            status_change(1, 10, "Backlog", "In Development"),
            status_change(4, 10, "In Development", "Done"),
        ],
    );
    let keys = vec![IssueKey::new("PROJ-9")];

    let involved = AccountId::new(PERSON_A);
    let results = calculate_many(&provider, &engine(), &keys, Some(&involved)).await;
    assert!(results[0].seconds.is_some());

    let uninvolved = AccountId::new(PERSON_B);
    let results = calculate_many(&provider, &engine(), &keys, Some(&uninvolved)).await;
    assert!(results[0].seconds.is_none());
}

#[tokio::test]
async fn test_report_summary_over_completed_items() {
    let provider = provider_with_two_issues();
    let request = ReportRequest {
        issue_keys: vec![
            IssueKey::new("PROJ-1"),
            IssueKey::new("PROJ-2"),
            IssueKey::new("PROJ-404"),
        ],
        worker: None,
    };

    let report = compute_report(&provider, &engine(), &request).await;

    assert_eq!(report.cycle_times.len(), 3);
    // Only the two computed items feed the summary.
    assert_eq!(report.summary.count, 2);
    assert_eq!(report.summary.avg_days, Some(3.0));
    assert_eq!(report.summary.max_days, Some(4.0));
    assert_eq!(report.summary.median_days, Some(3.0));
}

#[test]
fn test_build_report_empty_batch() {
    let report = build_report(vec![]);
    assert_eq!(report.summary.count, 0);
    assert!(report.summary.avg_days.is_none());
}

#[cfg(feature = "http-server")]
mod job_processing {
    use super::*;
    use cadence_rust::services::report::process_report_async;
    use cadence_rust::services::report_jobs::{ReportJobStatus, ReportJobs};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_process_report_async_completes_job() {
        let provider: Arc<dyn HistoryProvider> = Arc::new(provider_with_two_issues());
        let jobs = ReportJobs::new();
        let job_id = jobs.create(2);

        let request = ReportRequest {
            issue_keys: vec![IssueKey::new("PROJ-1"), IssueKey::new("PROJ-404")],
            worker: None,
        };

        let report =
            process_report_async(job_id.clone(), jobs.clone(), provider, engine(), request).await;

        assert_eq!(report.cycle_times.len(), 2);
        assert_eq!(report.summary.count, 1);

        let job = jobs.get(&job_id).unwrap();
        assert_eq!(job.status, ReportJobStatus::Completed);
        assert_eq!(job.progress.issues_done, 2);
        assert_eq!(job.progress.fetch_failures, 1);
        assert!(job.finished_at.is_some());

        // The registry holds the same typed report the caller got back.
        let stored = job.report.unwrap();
        assert_eq!(stored.summary.count, report.summary.count);
        assert_eq!(stored.cycle_times.len(), report.cycle_times.len());

        let final_event = job.events.last().unwrap();
        assert!(final_event.message.contains("Report complete"));
    }

    #[tokio::test]
    async fn test_job_events_record_fetch_failures() {
        let provider: Arc<dyn HistoryProvider> = Arc::new(StaticHistoryProvider::new());
        let jobs = ReportJobs::new();
        let job_id = jobs.create(1);

        let request = ReportRequest {
            issue_keys: vec![IssueKey::new("PROJ-404")],
            worker: None,
        };

        process_report_async(job_id.clone(), jobs.clone(), provider, engine(), request).await;

        let events = jobs.events(&job_id);
        assert!(events.iter().any(|e| e.message.contains("PROJ-404 failed")));
    }
}
