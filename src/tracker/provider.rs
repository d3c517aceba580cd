//! The history-provider abstraction.
//!
//! The engine never talks to the network itself; it consumes complete
//! changelogs through this trait. The REST client implements it for the
//! live tracker, and [`StaticHistoryProvider`] serves tests and demos from
//! memory.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::api::IssueKey;
use crate::models::history::HistoryEntry;

use super::error::{TrackerError, TrackerResult};

/// Source of complete change histories.
///
/// Implementations return the *full* history for an issue (paginating
/// internally when necessary); entries may be in any order.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn changelog(&self, issue_key: &IssueKey) -> TrackerResult<Vec<HistoryEntry>>;
}

/// In-memory provider backed by a fixed map of histories.
#[derive(Debug, Clone, Default)]
pub struct StaticHistoryProvider {
    histories: HashMap<IssueKey, Vec<HistoryEntry>>,
}

impl StaticHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(
        mut self,
        issue_key: impl Into<IssueKey>,
        histories: Vec<HistoryEntry>,
    ) -> Self {
        self.histories.insert(issue_key.into(), histories);
        self
    }

    pub fn insert(&mut self, issue_key: IssueKey, histories: Vec<HistoryEntry>) {
        self.histories.insert(issue_key, histories);
    }
}

#[async_trait]
impl HistoryProvider for StaticHistoryProvider {
    async fn changelog(&self, issue_key: &IssueKey) -> TrackerResult<Vec<HistoryEntry>> {
        self.histories.get(issue_key).cloned().ok_or_else(|| {
            TrackerError::Status {
                operation: "changelog".to_string(),
                status: 404,
                body: format!("unknown issue {}", issue_key),
            }
        })
    }
}
