//! The cycle-time engine.
//!
//! A deterministic, pure mapping from `(change history, status vocabulary,
//! optional worker)` to a [`CycleTime`] record. The engine classifies the
//! workflow event stream into open→close work cycles, reconstructs
//! worker-assignment intervals, reconciles excluded-status and
//! impediment-flagged time (with overlap accounting), and routes each item
//! to a simple or a complex algorithm.
//!
//! The engine is synchronous and single-threaded per item: no suspension
//! points, no shared mutable state, and bit-identical output for identical
//! inputs. Batch orchestration lives in the service layer.

pub(crate) mod accumulators;
pub(crate) mod complex;
pub(crate) mod cycles;
pub(crate) mod events;
pub(crate) mod intervals;
pub(crate) mod simple;


use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AccountId, IssueKey};
use crate::models::history::{FieldKind, HistoryEntry};
use crate::models::time::TIMESTAMP_SHIFT_HOURS;
use crate::models::vocabulary::StatusVocabulary;

use accumulators::account_window;
use complex::ComplexStrategy;
use cycles::Cycle;
use events::EventLog;
use simple::SimpleStrategy;

/// Tunable engine constants.
///
/// The defaults reproduce the historical tool: a +1h timestamp correction,
/// a 4-hour same-day hand-off grace, and a fixed set of parked statuses that
/// veto spurious work-start transitions.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Correction added to every parsed vendor timestamp.
    pub timestamp_shift: Duration,
    /// How long past an assignment interval's end (same calendar day) a
    /// status transition is still attributed to the outgoing worker.
    pub handoff_grace: Duration,
    /// Statuses that never count as a work start.
    pub non_work_statuses: HashSet<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            timestamp_shift: Duration::hours(TIMESTAMP_SHIFT_HOURS),
            handoff_grace: Duration::hours(4),
            non_work_statuses: ["on hold", "waiting", "paused", "stopped", "cancelled"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl EngineOptions {
    pub(crate) fn is_non_work(&self, status: &str) -> bool {
        self.non_work_statuses.contains(status)
    }
}

/// The engine's output for one work item.
///
/// Invariants: when `seconds` is present, both instants are present and
/// `done_at >= in_progress_at`; `seconds` is never negative; the accounting
/// durations are clipped to the cycle windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleTime {
    pub issue_key: IssueKey,
    pub in_progress_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    /// Active seconds: elapsed time minus excluded and impediment time,
    /// plus their overlap.
    pub seconds: Option<f64>,
    pub excluded_seconds: Option<f64>,
    pub impediment_seconds: Option<f64>,
}

impl CycleTime {
    /// Result for an item where no work start could be established.
    pub fn empty(issue_key: IssueKey) -> Self {
        Self {
            issue_key,
            in_progress_at: None,
            done_at: None,
            seconds: None,
            excluded_seconds: None,
            impediment_seconds: None,
        }
    }

    /// Result for an item that started but never completed.
    pub fn started(issue_key: IssueKey, in_progress_at: DateTime<Utc>) -> Self {
        Self {
            in_progress_at: Some(in_progress_at),
            ..Self::empty(issue_key)
        }
    }
}

/// Which algorithm the selector chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Simple,
    Complex,
}

/// The selector's decision together with the counts that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub kind: StrategyKind,
    pub assignee_events: usize,
    pub status_events: usize,
    pub has_worker_filter: bool,
    pub reasons: Vec<String>,
}

impl StrategyDecision {
    /// Route to the complex algorithm when a worker filter is present, when
    /// more than two assignee events exist, or when more than five status
    /// events exist.
    pub fn evaluate(histories: &[HistoryEntry], has_worker_filter: bool) -> Self {
        let mut assignee_events = 0;
        let mut status_events = 0;

        for entry in histories {
            for item in &entry.items {
                match FieldKind::classify(&item.field) {
                    FieldKind::Assignee => assignee_events += 1,
                    FieldKind::Status => status_events += 1,
                    _ => {}
                }
            }
        }

        let mut reasons = Vec::new();
        if has_worker_filter {
            reasons.push("worker filter provided".to_string());
        }
        if assignee_events > 2 {
            reasons.push(format!("multiple assignee changes ({})", assignee_events));
        }
        if status_events > 5 {
            reasons.push(format!("many status changes ({})", status_events));
        }

        let kind = if reasons.is_empty() {
            reasons.push("simple linear process".to_string());
            StrategyKind::Simple
        } else {
            StrategyKind::Complex
        };

        Self {
            kind,
            assignee_events,
            status_events,
            has_worker_filter,
            reasons,
        }
    }
}

/// Engine façade: holds the vocabulary and options, dispatches per item.
#[derive(Debug, Clone)]
pub struct CycleTimeEngine {
    vocabulary: StatusVocabulary,
    options: EngineOptions,
}

impl CycleTimeEngine {
    pub fn new(vocabulary: StatusVocabulary) -> Self {
        Self::with_options(vocabulary, EngineOptions::default())
    }

    pub fn with_options(vocabulary: StatusVocabulary, options: EngineOptions) -> Self {
        Self {
            vocabulary,
            options,
        }
    }

    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Which strategy would be used for this history, with the counts that
    /// drove the decision.
    pub fn decide_strategy(
        &self,
        histories: &[HistoryEntry],
        worker: Option<&AccountId>,
    ) -> StrategyDecision {
        StrategyDecision::evaluate(histories, worker.is_some())
    }

    /// Compute the cycle time of one work item.
    ///
    /// Pure and deterministic: the history may arrive in any order, and the
    /// result is identical for any permutation of it.
    pub fn calculate(
        &self,
        histories: &[HistoryEntry],
        issue_key: &IssueKey,
        worker: Option<&AccountId>,
    ) -> CycleTime {
        let decision = self.decide_strategy(histories, worker);
        log::debug!(
            "{}: strategy={:?} ({})",
            issue_key,
            decision.kind,
            decision.reasons.join(", ")
        );

        let log = EventLog::index(histories, &self.options);

        match decision.kind {
            StrategyKind::Simple => SimpleStrategy {
                vocabulary: &self.vocabulary,
                options: &self.options,
            }
            .calculate(&log, issue_key),
            StrategyKind::Complex => ComplexStrategy {
                vocabulary: &self.vocabulary,
                options: &self.options,
            }
            .calculate(&log, issue_key, worker.map(AccountId::as_str)),
        }
    }
}

/// Build the result for a single `[start, end]` window.
pub(crate) fn windowed_cycle_time(
    issue_key: &IssueKey,
    log: &EventLog,
    vocabulary: &StatusVocabulary,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CycleTime {
    let accounting = account_window(log, vocabulary, start, end);

    CycleTime {
        issue_key: issue_key.clone(),
        in_progress_at: Some(start),
        done_at: Some(end),
        seconds: Some(accounting.active),
        excluded_seconds: Some(accounting.excluded),
        impediment_seconds: Some(accounting.impediment),
    }
}

/// Build the result for a multi-cycle item: accounting summed over the
/// completed cycles, earliest start, latest end.
pub(crate) fn summed_cycle_time(
    issue_key: &IssueKey,
    log: &EventLog,
    vocabulary: &StatusVocabulary,
    cycles: &[Cycle],
) -> CycleTime {
    let Some(first_start) = cycles.iter().map(|c| c.start).min() else {
        return CycleTime::empty(issue_key.clone());
    };

    let mut total_active = 0.0;
    let mut total_excluded = 0.0;
    let mut total_impediment = 0.0;
    let mut last_done: Option<DateTime<Utc>> = None;

    for cycle in cycles {
        let Some(end) = cycle.end else {
            continue;
        };
        last_done = Some(last_done.map_or(end, |d| d.max(end)));

        let accounting = account_window(log, vocabulary, cycle.start, end);
        total_active += accounting.active;
        total_excluded += accounting.excluded;
        total_impediment += accounting.impediment;
    }

    let Some(done_at) = last_done else {
        return CycleTime::started(issue_key.clone(), first_start);
    };

    CycleTime {
        issue_key: issue_key.clone(),
        in_progress_at: Some(first_start),
        done_at: Some(done_at),
        seconds: Some(total_active),
        excluded_seconds: Some(total_excluded),
        impediment_seconds: Some(total_impediment),
    }
}
