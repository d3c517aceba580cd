//! Work-cycle reconstruction.
//!
//! A cycle is a maximal `[in-progress, done]` pair of status transitions.
//! Reopened items produce several cycles; the last one may still be open.

use chrono::{DateTime, Utc};

use crate::models::vocabulary::StatusVocabulary;

use super::events::EventLog;
use super::intervals::{is_within, Interval};
use super::EngineOptions;

/// One open→close work cycle. `end == None` means still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cycle {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

/// Fold status events into work cycles.
///
/// A transition into an in-progress status opens a cycle when none is open;
/// a transition into a done status closes the open one. Transitions outside
/// the worker's assignment intervals are discarded, in-progress→in-progress
/// does not open a second cycle, and done with no open cycle is ignored.
pub(crate) fn find_cycles(
    log: &EventLog,
    vocabulary: &StatusVocabulary,
    intervals: Option<&[Interval]>,
    options: &EngineOptions,
) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let mut open: Option<DateTime<Utc>> = None;

    for event in log.status_events() {
        if vocabulary.is_in_progress(event.to) && open.is_none() {
            if is_within(event.at, intervals, options.handoff_grace) {
                open = Some(event.at);
            }
        } else if vocabulary.is_done(event.to) {
            if let Some(start) = open {
                if is_within(event.at, intervals, options.handoff_grace) {
                    cycles.push(Cycle {
                        start,
                        end: Some(event.at),
                    });
                    open = None;
                }
            }
        }
    }

    if let Some(start) = open {
        cycles.push(Cycle { start, end: None });
    }

    cycles
}

/// True when any transition goes from a done status into an in-progress
/// status, i.e. the item was closed and reopened for more work. Tracks the
/// chain of `to` statuses, so simultaneous or unordered `from` labels cannot
/// fake a reopening.
pub(crate) fn has_reopening(log: &EventLog, vocabulary: &StatusVocabulary) -> bool {
    let mut previous: Option<&str> = None;

    for event in log.status_events() {
        if let Some(prev) = previous {
            if vocabulary.is_done(prev) && vocabulary.is_in_progress(event.to) {
                return true;
            }
        }
        previous = Some(event.to);
    }

    false
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

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_single_cycle() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Done"),
        ]);
        let cycles = find_cycles(&log, &vocab(), None, &EngineOptions::default());
        assert_eq!(cycles, vec![Cycle { start: utc(1, 11), end: Some(utc(5, 11)) }]);
    }

    #[test]
    fn test_in_progress_to_in_progress_keeps_cycle_open() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(2, 10, "In Development", "In Review"),
            status(3, 10, "In Review", "Done"),
        ]);
        let cycles = find_cycles(&log, &vocab(), None, &EngineOptions::default());
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].start, utc(1, 11));
    }

    #[test]
    fn test_reopening_produces_two_cycles() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Done"),
            status(6, 10, "Done", "In Development"),
            status(8, 10, "In Development", "Done"),
        ]);
        let cycles = find_cycles(&log, &vocab(), None, &EngineOptions::default());
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1].start, utc(6, 11));
        assert_eq!(cycles[1].end, Some(utc(8, 11)));
    }

    #[test]
    fn test_trailing_open_cycle() {
        let log = log_from(&[status(1, 10, "Backlog", "In Development")]);
        let cycles = find_cycles(&log, &vocab(), None, &EngineOptions::default());
        assert_eq!(cycles, vec![Cycle { start: utc(1, 11), end: None }]);
    }

    #[test]
    fn test_done_without_open_cycle_ignored() {
        let log = log_from(&[status(2, 10, "Acceptance", "Done")]);
        assert!(find_cycles(&log, &vocab(), None, &EngineOptions::default()).is_empty());
    }

    #[test]
    fn test_has_reopening() {
        let reopened = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Done"),
            status(6, 10, "Done", "In Development"),
        ]);
        assert!(has_reopening(&reopened, &vocab()));

        let linear = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Done"),
        ]);
        assert!(!has_reopening(&linear, &vocab()));
    }
}
