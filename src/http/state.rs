//! Application state for the HTTP server.

use std::sync::Arc;

use crate::api::CycleTimeEngine;
use crate::services::report_jobs::ReportJobs;
use crate::tracker::HistoryProvider;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Changelog source for all computations
    pub provider: Arc<dyn HistoryProvider>,
    /// Engine configured with the default vocabulary
    pub engine: Arc<CycleTimeEngine>,
    /// Registry of background report jobs
    pub jobs: ReportJobs,
    /// Search client for query-based report requests
    #[cfg(feature = "remote-tracker")]
    pub search: Option<Arc<crate::tracker::TrackerClient>>,
}

impl AppState {
    /// Create a new application state with the given provider and engine.
    pub fn new(provider: Arc<dyn HistoryProvider>, engine: CycleTimeEngine) -> Self {
        Self {
            provider,
            engine: Arc::new(engine),
            jobs: ReportJobs::new(),
            #[cfg(feature = "remote-tracker")]
            search: None,
        }
    }

    /// Attach a search client for query-based report requests.
    #[cfg(feature = "remote-tracker")]
    pub fn with_search(mut self, client: Arc<crate::tracker::TrackerClient>) -> Self {
        self.search = Some(client);
        self
    }
}
