//! Complex cycle-time calculation for processes with several workers or
//! convoluted status flows.
//!
//! Handles worker-interval filtering, hand-off versus first-assignment
//! disambiguation, reopened items, resolution-based completion fallback, and
//! the QA start-detection specialisation.

use chrono::{DateTime, Utc};

use crate::api::IssueKey;
use crate::models::vocabulary::StatusVocabulary;

use super::cycles::{find_cycles, has_reopening};
use super::events::{EventKind, EventLog};
use super::intervals::{assignment_intervals, first_start, is_within, Interval};
use super::{summed_cycle_time, windowed_cycle_time, CycleTime, EngineOptions};

const STATUS_ACCEPTANCE: &str = "acceptance";
const STATUS_IN_REVIEW: &str = "in review";
const STATUS_BACKLOG: &str = "backlog";

pub(crate) struct ComplexStrategy<'a> {
    pub vocabulary: &'a StatusVocabulary,
    pub options: &'a EngineOptions,
}

impl ComplexStrategy<'_> {
    pub fn calculate(
        &self,
        log: &EventLog,
        issue_key: &IssueKey,
        worker: Option<&str>,
    ) -> CycleTime {
        if self.vocabulary.is_qa() {
            if let Some(worker) = worker {
                if let Some((qa_start, start_status)) = self.find_qa_start(log, worker) {
                    return self.with_qa_start(log, issue_key, qa_start, &start_status);
                }
            }
        }

        // Worker-interval construction. A worker with no formal assignment
        // who nonetheless drove the workflow is treated as unfiltered; a
        // worker who never touched the item yields an empty result.
        let owned_intervals;
        let intervals: Option<&[Interval]> = match worker {
            Some(worker) => {
                owned_intervals = assignment_intervals(log, worker);
                if owned_intervals.is_empty() {
                    if self.authored_workflow_transition(log, worker) {
                        None
                    } else {
                        return CycleTime::empty(issue_key.clone());
                    }
                } else {
                    Some(&owned_intervals)
                }
            }
            None => None,
        };

        if has_reopening(log, self.vocabulary) {
            let cycles = find_cycles(log, self.vocabulary, intervals, self.options);
            return summed_cycle_time(issue_key, log, self.vocabulary, &cycles);
        }

        self.first_to_last(log, issue_key, worker, intervals)
    }

    fn first_to_last(
        &self,
        log: &EventLog,
        issue_key: &IssueKey,
        worker: Option<&str>,
        intervals: Option<&[Interval]>,
    ) -> CycleTime {
        let Some(started) = self.find_work_start(log, intervals) else {
            return CycleTime::empty(issue_key.clone());
        };

        let Some(done) = self.find_completion(log, started, worker, intervals) else {
            return CycleTime::started(issue_key.clone(), started);
        };

        windowed_cycle_time(issue_key, log, self.vocabulary, started, done)
    }

    /// Locate the most plausible work-start instant.
    ///
    /// The global earliest in-progress transition wins unless it falls
    /// outside the worker's intervals; in that case a hand-off anchors the
    /// start at the assignment instant, while a first assignment onto an
    /// already-in-progress item keeps the original transition time.
    fn find_work_start(
        &self,
        log: &EventLog,
        intervals: Option<&[Interval]>,
    ) -> Option<DateTime<Utc>> {
        let status_events: Vec<_> = log.status_events().collect();

        let mut transitions = Vec::new();
        for (index, event) in status_events.iter().enumerate() {
            if !self.vocabulary.is_in_progress(event.to) {
                continue;
            }
            if self.options.is_non_work(event.to) {
                continue;
            }
            let parked = self.leads_to_non_work(&status_events[index + 1..]);
            transitions.push((event.at, parked));
        }

        let mut valid: Vec<DateTime<Utc>> = transitions
            .iter()
            .filter(|(_, parked)| !parked)
            .map(|(at, _)| *at)
            .collect();
        if valid.is_empty() {
            // Fall back to any in-progress transition when all of them are
            // immediately parked.
            valid = transitions.iter().map(|(at, _)| *at).collect();
        }

        if valid.is_empty() {
            return intervals.and_then(|iv| self.handoff_assignment_start(log, iv));
        }

        let global_first = valid[0];
        let Some(intervals) = intervals else {
            return Some(global_first);
        };

        if is_within(global_first, Some(intervals), self.options.handoff_grace) {
            return Some(global_first);
        }

        // Work started before the worker was assigned. A prior assignee
        // makes this a hand-off: the assignment instant is the start.
        if let Some(at) = self.handoff_assignment_start(log, intervals) {
            return Some(at);
        }

        // First assignment onto an already-in-progress item: the original
        // status-change instant is the start even though it precedes the
        // interval.
        if let Some(first_assigned) = first_start(intervals) {
            if let Some(status) = log.status_at(first_assigned) {
                if self.vocabulary.is_in_progress(status) {
                    return Some(global_first);
                }
            }
        }

        valid
            .into_iter()
            .find(|at| is_within(*at, Some(intervals), self.options.handoff_grace))
    }

    /// True when the transition is followed by a parked status before any
    /// further in-progress status.
    fn leads_to_non_work(&self, rest: &[super::events::StatusEvent<'_>]) -> bool {
        for event in rest {
            if self.options.is_non_work(event.to) {
                return true;
            }
            if self.vocabulary.is_in_progress(event.to) {
                return false;
            }
        }
        false
    }

    /// The first assignment instant, when it was a hand-off: the item was
    /// already in an in-progress status and somebody else held it before.
    fn handoff_assignment_start(
        &self,
        log: &EventLog,
        intervals: &[Interval],
    ) -> Option<DateTime<Utc>> {
        let first_assigned = first_start(intervals)?;

        let mut current_status: Option<&str> = None;
        let mut previous_assignee: Option<&str> = None;

        for event in log.events() {
            if event.at > first_assigned {
                break;
            }
            match &event.kind {
                EventKind::Status { to, .. } => current_status = Some(to.as_str()),
                EventKind::Assignee { to, .. } if event.at < first_assigned => {
                    previous_assignee = to.as_deref();
                }
                _ => {}
            }
        }

        let in_progress = current_status
            .map(|s| self.vocabulary.is_in_progress(s))
            .unwrap_or(false);
        if in_progress && previous_assignee.is_some() {
            Some(first_assigned)
        } else {
            None
        }
    }

    /// Earliest completion after `started`: status transitions into the done
    /// set are preferred; resolution events with a meaningful value are the
    /// fallback. A "Won't Do" resolution only counts when the target worker
    /// set it.
    fn find_completion(
        &self,
        log: &EventLog,
        started: DateTime<Utc>,
        worker: Option<&str>,
        intervals: Option<&[Interval]>,
    ) -> Option<DateTime<Utc>> {
        let mut first_status: Option<DateTime<Utc>> = None;
        let mut first_resolution: Option<DateTime<Utc>> = None;

        for event in log.events() {
            if event.at <= started {
                continue;
            }
            if !is_within(event.at, intervals, self.options.handoff_grace) {
                continue;
            }

            match &event.kind {
                EventKind::Status { to, .. } if self.vocabulary.is_done(to) => {
                    if first_status.is_none() {
                        first_status = Some(event.at);
                    }
                }
                EventKind::Resolution { to } => {
                    if first_resolution.is_none() && self.resolution_completes(event, to, worker) {
                        first_resolution = Some(event.at);
                    }
                }
                _ => {}
            }
        }

        first_status.or(first_resolution)
    }

    fn resolution_completes(
        &self,
        event: &super::events::Event,
        resolution: &str,
        worker: Option<&str>,
    ) -> bool {
        let lowered = resolution.to_lowercase();
        if lowered == "won't do" || lowered == "wont do" {
            return match worker {
                Some(worker) => event.authored_by(worker),
                None => true,
            };
        }
        !resolution.is_empty() && lowered != "none"
    }

    /// Whether the worker authored any transition into an in-progress or
    /// done status. Covers items driven through the workflow without a
    /// formal assignment.
    fn authored_workflow_transition(&self, log: &EventLog, worker: &str) -> bool {
        log.status_events().any(|ev| {
            ev.author == Some(worker)
                && (self.vocabulary.is_in_progress(ev.to) || self.vocabulary.is_done(ev.to))
        })
    }

    // ---- QA specialisation -------------------------------------------------

    /// Detect the QA-specific work start. Three patterns, searched in
    /// chronological order:
    /// 1. the worker moves the item out of Backlog,
    /// 2. the worker becomes assignee while the item sits in Acceptance,
    /// 3. the worker, assigned during In Review, moves it to Acceptance.
    fn find_qa_start(&self, log: &EventLog, worker: &str) -> Option<(DateTime<Utc>, String)> {
        let mut current_status: Option<&str> = None;
        let mut current_assignee: Option<&str> = None;
        let mut assigned_on_in_review = false;

        for event in log.events() {
            match &event.kind {
                EventKind::Status { from, to } => {
                    if from == STATUS_BACKLOG && event.authored_by(worker) {
                        return Some((event.at, to.clone()));
                    }

                    if from == STATUS_IN_REVIEW && to == STATUS_ACCEPTANCE {
                        let assigned = current_assignee == Some(worker) || assigned_on_in_review;
                        if assigned && event.authored_by(worker) {
                            return Some((event.at, STATUS_ACCEPTANCE.to_string()));
                        }
                    }

                    if to == STATUS_ACCEPTANCE
                        && current_assignee == Some(worker)
                        && event.authored_by(worker)
                    {
                        return Some((event.at, STATUS_ACCEPTANCE.to_string()));
                    }

                    current_status = Some(to.as_str());
                }
                EventKind::Assignee { from, to } => {
                    if to.as_deref() == Some(worker) {
                        current_assignee = Some(worker);
                        if current_status == Some(STATUS_ACCEPTANCE) {
                            return Some((event.at, STATUS_ACCEPTANCE.to_string()));
                        }
                        if current_status == Some(STATUS_IN_REVIEW) {
                            assigned_on_in_review = true;
                        }
                    } else if from.as_deref() == Some(worker) {
                        current_assignee = to.as_deref();
                        assigned_on_in_review = false;
                    }
                }
                _ => {}
            }
        }

        None
    }

    /// QA cycles end at the first status change that leaves the start
    /// status.
    fn find_qa_end(
        &self,
        log: &EventLog,
        qa_start: DateTime<Utc>,
        start_status: &str,
    ) -> Option<DateTime<Utc>> {
        log.status_events()
            .find(|ev| ev.at > qa_start && ev.from == start_status && ev.to != start_status)
            .map(|ev| ev.at)
    }

    fn with_qa_start(
        &self,
        log: &EventLog,
        issue_key: &IssueKey,
        qa_start: DateTime<Utc>,
        start_status: &str,
    ) -> CycleTime {
        let Some(done) = self.find_qa_end(log, qa_start, start_status) else {
            return CycleTime::started(issue_key.clone(), qa_start);
        };

        windowed_cycle_time(issue_key, log, self.vocabulary, qa_start, done)
    }
}
