//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for business logic.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{
    CreateReportRequest, CreateReportResponse, CycleTime, CycleTimeQuery, HealthResponse,
    ReportJob, ReportJobStatus,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{AccountId, CycleTimeEngine, IssueKey, ReportRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    #[cfg(feature = "remote-tracker")]
    let tracker = if state.search.is_some() {
        "configured".to_string()
    } else {
        "static".to_string()
    };
    #[cfg(not(feature = "remote-tracker"))]
    let tracker = {
        let _ = &state;
        "static".to_string()
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        tracker,
    }))
}

// =============================================================================
// Single-issue computation
// =============================================================================

/// GET /v1/issues/{issue_key}/cycle-time
///
/// Compute the cycle time of one issue on demand.
pub async fn get_cycle_time(
    State(state): State<AppState>,
    Path(issue_key): Path<String>,
    Query(query): Query<CycleTimeQuery>,
) -> HandlerResult<CycleTime> {
    let issue_key = IssueKey::new(issue_key);
    let worker = query.worker.map(AccountId::new);

    let histories = state.provider.changelog(&issue_key).await?;
    let result = state.engine.calculate(&histories, &issue_key, worker.as_ref());

    Ok(Json(result))
}

// =============================================================================
// Report jobs
// =============================================================================

/// POST /v1/reports
///
/// Create a batch report asynchronously. Returns a job ID for tracking
/// progress.
pub async fn create_report(
    State(state): State<AppState>,
    Json(request): Json<CreateReportRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateReportResponse>), AppError> {
    let issue_keys = resolve_issue_keys(&state, &request).await?;
    if issue_keys.is_empty() {
        return Err(AppError::BadRequest(
            "no issue keys: provide issue_keys or a query".to_string(),
        ));
    }

    // Per-request vocabulary override builds a dedicated engine; overlap
    // errors are the caller's contract violation.
    let engine: Arc<CycleTimeEngine> = match &request.vocabulary {
        Some(vocabulary) => {
            let vocabulary = vocabulary
                .to_vocabulary()
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            Arc::new(CycleTimeEngine::with_options(
                vocabulary,
                state.engine.options().clone(),
            ))
        }
        None => state.engine.clone(),
    };

    let report_request = ReportRequest {
        issue_keys,
        worker: request.worker.map(AccountId::new),
    };

    // Register the job, then compute in the background
    let job_id = state.jobs.create(report_request.issue_keys.len());
    let response_job_id = job_id.clone();

    let jobs = state.jobs.clone();
    let provider = state.provider.clone();

    tokio::spawn(async move {
        crate::services::report::process_report_async(
            job_id,
            jobs,
            provider,
            (*engine).clone(),
            report_request,
        )
        .await;
    });

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(CreateReportResponse {
            job_id: response_job_id.clone(),
            message: format!(
                "Report started. Track progress at /v1/jobs/{}/logs",
                response_job_id
            ),
        }),
    ))
}

async fn resolve_issue_keys(
    state: &AppState,
    request: &CreateReportRequest,
) -> Result<Vec<IssueKey>, AppError> {
    if !request.issue_keys.is_empty() {
        return Ok(request
            .issue_keys
            .iter()
            .map(|key| IssueKey::new(key.as_str()))
            .collect());
    }

    let Some(query) = request.query.as_deref() else {
        return Ok(Vec::new());
    };

    #[cfg(feature = "remote-tracker")]
    if let Some(search) = state.search.as_ref() {
        return Ok(search.search_issue_keys(query).await?);
    }

    let _ = (state, query);
    Err(AppError::BadRequest(
        "query-based reports need a configured tracker".to_string(),
    ))
}

// =============================================================================
// Async Job Management
// =============================================================================

/// GET /v1/jobs/{job_id}
///
/// Get a background job: status, progress counters, event feed, and the
/// report once completed. Serialisation comes straight from the job types,
/// so the polled and streamed representations cannot diverge.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<ReportJob> {
    let job = state
        .jobs
        .get(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(job))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream a job's progress events via Server-Sent Events: one event per
/// processed issue, then a `complete` event carrying the terminal status and
/// the report.
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.jobs.get(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let jobs = state.jobs.clone();
    let stream = async_stream::stream! {
        let mut sent = 0;
        loop {
            // Forward events that arrived since the last poll
            let events = jobs.events(&job_id);
            for event in events.iter().skip(sent) {
                let data = serde_json::to_string(event).unwrap_or_default();
                yield Ok(Event::default().data(data));
            }
            sent = events.len();

            let Some(job) = jobs.get(&job_id) else {
                break;
            };
            if job.status != ReportJobStatus::Running {
                let terminal = serde_json::json!({
                    "status": job.status,
                    "report": job.report,
                });
                yield Ok(Event::default()
                    .event("complete")
                    .data(serde_json::to_string(&terminal).unwrap_or_default()));
                break;
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
