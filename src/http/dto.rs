//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! The engine, report, and job types are re-exported from the api and
//! services modules since they already derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    CycleTime, CycleTimeReport, CycleTimeSummary, StrategyDecision, StrategyKind,
};
pub use crate::services::report_jobs::{ProgressEvent, ReportJob, ReportJobStatus};
use crate::models::{StatusVocabulary, VocabularyError};

/// Request body for creating a report job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportRequest {
    /// Issue keys to process
    #[serde(default)]
    pub issue_keys: Vec<String>,
    /// Search query resolved to issue keys (requires the remote tracker)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Restrict computation to this worker's account id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
    /// Override the configured status vocabulary for this report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<VocabularyOverride>,
}

/// Per-request status vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyOverride {
    pub in_progress: Vec<String>,
    pub done: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub is_qa: bool,
}

impl VocabularyOverride {
    pub fn to_vocabulary(&self) -> Result<StatusVocabulary, VocabularyError> {
        StatusVocabulary::new(&self.in_progress, &self.done, &self.excluded, self.is_qa)
    }
}

/// Response for report creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportResponse {
    /// Job ID for tracking progress
    pub job_id: String,
    /// Message about the operation
    pub message: String,
}

/// Query parameters for the single-issue endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CycleTimeQuery {
    /// Restrict computation to this worker's account id
    #[serde(default)]
    pub worker: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Whether a remote tracker is configured
    pub tracker: String,
}
