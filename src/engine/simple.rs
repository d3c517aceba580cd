//! Simple cycle-time calculation for clean, linear processes.
//!
//! Assumes a single assignee (or no worker filter) and a mostly linear
//! status progression. Reopened items fall back to the multi-cycle path;
//! everything else takes the fast first→last route.

use chrono::{DateTime, Utc};

use crate::api::IssueKey;
use crate::models::vocabulary::StatusVocabulary;

use super::cycles::{find_cycles, has_reopening};
use super::events::EventLog;
use super::{summed_cycle_time, windowed_cycle_time, CycleTime, EngineOptions};

pub(crate) struct SimpleStrategy<'a> {
    pub vocabulary: &'a StatusVocabulary,
    pub options: &'a EngineOptions,
}

impl SimpleStrategy<'_> {
    /// Compute the cycle time. Any provided worker identity is ignored;
    /// the selector only routes here when no filtering is needed.
    pub fn calculate(&self, log: &EventLog, issue_key: &IssueKey) -> CycleTime {
        if has_reopening(log, self.vocabulary) {
            let cycles = find_cycles(log, self.vocabulary, None, self.options);
            return summed_cycle_time(issue_key, log, self.vocabulary, &cycles);
        }

        self.first_to_last(log, issue_key)
    }

    fn first_to_last(&self, log: &EventLog, issue_key: &IssueKey) -> CycleTime {
        let Some(started) = self.first_in_progress(log) else {
            return CycleTime::empty(issue_key.clone());
        };

        let Some(done) = self.first_done_after(log, started) else {
            return CycleTime::started(issue_key.clone(), started);
        };

        windowed_cycle_time(issue_key, log, self.vocabulary, started, done)
    }

    fn first_in_progress(&self, log: &EventLog) -> Option<DateTime<Utc>> {
        log.status_events()
            .find(|ev| self.vocabulary.is_in_progress(ev.to))
            .map(|ev| ev.at)
    }

    fn first_done_after(&self, log: &EventLog, started: DateTime<Utc>) -> Option<DateTime<Utc>> {
        log.status_events()
            .find(|ev| ev.at > started && self.vocabulary.is_done(ev.to))
            .map(|ev| ev.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{log_from, status};
    use chrono::TimeZone;

    fn vocab() -> StatusVocabulary {
        StatusVocabulary::new(
            &["In Development", "In Review"],
            &["Done", "Closed"],
            &["Acceptance"],
            false,
        )
        .unwrap()
    }

    fn calculate(log: &EventLog) -> CycleTime {
        let vocabulary = vocab();
        let options = EngineOptions::default();
        let strategy = SimpleStrategy {
            vocabulary: &vocabulary,
            options: &options,
        };
        strategy.calculate(log, &IssueKey::new("TEST-1"))
    }

    const DAY: f64 = 86_400.0;

    #[test]
    fn test_linear_flow() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 15, "In Development", "Done"),
        ]);
        let result = calculate(&log);

        assert_eq!(
            result.in_progress_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap())
        );
        assert_eq!(
            result.done_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 16, 0, 0).unwrap())
        );
        let seconds = result.seconds.unwrap();
        assert!((seconds - (4.0 * DAY + 5.0 * 3600.0)).abs() < 1.0);
    }

    #[test]
    fn test_no_in_progress_transition() {
        let log = log_from(&[status(1, 10, "Backlog", "Ready")]);
        let result = calculate(&log);
        assert!(result.in_progress_at.is_none());
        assert!(result.done_at.is_none());
        assert!(result.seconds.is_none());
    }

    #[test]
    fn test_in_progress_without_done() {
        let log = log_from(&[status(1, 10, "Backlog", "In Development")]);
        let result = calculate(&log);
        assert!(result.in_progress_at.is_some());
        assert!(result.done_at.is_none());
        assert!(result.seconds.is_none());
    }

    #[test]
    fn test_reopened_item_sums_cycles() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Done"),
            status(6, 10, "Done", "In Development"),
            status(8, 10, "In Development", "Done"),
        ]);
        let result = calculate(&log);

        assert_eq!(
            result.in_progress_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap())
        );
        assert_eq!(
            result.done_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 8, 11, 0, 0).unwrap())
        );
        let seconds = result.seconds.unwrap();
        assert!((seconds - 6.0 * DAY).abs() < 1.0);
    }

    #[test]
    fn test_excluded_status_subtracted() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Acceptance"),
            status(7, 10, "Acceptance", "Done"),
        ]);
        let result = calculate(&log);

        let seconds = result.seconds.unwrap();
        assert!((seconds - 4.0 * DAY).abs() < 1.0);
        assert!((result.excluded_seconds.unwrap() - 2.0 * DAY).abs() < 1.0);
    }

    #[test]
    fn test_reopened_without_completed_cycle() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Done"),
            status(6, 10, "Done", "In Development"),
        ]);
        let result = calculate(&log);
        // One completed cycle and one open one: totals cover the closed one.
        assert!(result.seconds.is_some());
        assert_eq!(
            result.done_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 11, 0, 0).unwrap())
        );
    }
}
