//! Excluded-status, impediment, and overlap accounting within a window.
//!
//! Rather than re-scanning the history once per total, the window's
//! excluded-status runs and impediment runs are reconstructed as interval
//! lists in one pass each; the totals and the pairwise overlap fall out of
//! those lists. Both lists are chronological and disjoint by construction,
//! so the overlap is a single merge pass.

use chrono::{DateTime, Utc};

use crate::models::vocabulary::StatusVocabulary;

use super::events::{EventKind, EventLog};
use super::intervals::{duration_seconds, overlap_seconds};

/// Accounting totals for one cycle window, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct WindowAccounting {
    /// Active work time after subtractions, clamped at zero.
    pub active: f64,
    /// Time spent in excluded statuses.
    pub excluded: f64,
    /// Time spent flagged as an impediment.
    pub impediment: f64,
    /// Intersection of the two, added back to avoid double subtraction.
    pub overlap: f64,
}

/// Compute the accounting for the window `[w0, w1]`.
pub(crate) fn account_window(
    log: &EventLog,
    vocabulary: &StatusVocabulary,
    w0: DateTime<Utc>,
    w1: DateTime<Utc>,
) -> WindowAccounting {
    let excluded_runs = excluded_runs(log, vocabulary, w0, w1);
    let impediment_runs = impediment_runs(log, w0, w1);

    let excluded: f64 = excluded_runs.iter().map(|&(a, b)| duration_seconds(b - a)).sum();
    let impediment: f64 = impediment_runs.iter().map(|&(a, b)| duration_seconds(b - a)).sum();
    let overlap = merged_overlap(&excluded_runs, &impediment_runs);

    let total = duration_seconds(w1 - w0);
    let active = total - excluded - impediment + overlap;
    let active = if active < 0.0 {
        log::warn!(
            "active time clamped to zero: window={}s excluded={}s impediment={}s overlap={}s",
            total,
            excluded,
            impediment,
            overlap
        );
        0.0
    } else {
        active
    };

    WindowAccounting {
        active,
        excluded,
        impediment,
        overlap,
    }
}

/// Runs spent in an excluded status within `[w0, w1]`.
///
/// The tracked status starts unknown: a window that begins already inside an
/// excluded status contributes nothing until the first transition seen inside
/// the window. Consecutive excluded statuses form one run (widening the
/// excluded set can then only grow the runs, never shrink them), and a run
/// still open at `w1` is clipped there.
fn excluded_runs(
    log: &EventLog,
    vocabulary: &StatusVocabulary,
    w0: DateTime<Utc>,
    w1: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut runs = Vec::new();
    let mut in_excluded = false;
    let mut run_start: Option<DateTime<Utc>> = None;

    for event in log.status_events() {
        if event.at < w0 || event.at > w1 {
            continue;
        }

        let enters_excluded = vocabulary.is_excluded(event.to);
        if in_excluded && !enters_excluded {
            if let Some(start) = run_start.take() {
                runs.push((start, event.at));
            }
        } else if !in_excluded && enters_excluded {
            run_start = Some(event.at);
        }
        in_excluded = enters_excluded;
    }

    if in_excluded {
        if let Some(start) = run_start {
            runs.push((start, w1));
        }
    }

    runs
}

/// Runs during which the `Flagged` field equalled `Impediment` within
/// `[w0, w1]`. A clear (`none` or empty) closes the run; a re-flag while
/// already flagged restarts the clock; a run still open at `w1` is clipped.
fn impediment_runs(
    log: &EventLog,
    w0: DateTime<Utc>,
    w1: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut runs = Vec::new();
    let mut flagged_since: Option<DateTime<Utc>> = None;

    for event in log.events() {
        let EventKind::Flagged { to } = &event.kind else {
            continue;
        };
        if event.at < w0 || event.at > w1 {
            continue;
        }

        if let Some(start) = flagged_since {
            if to == "none" || to.is_empty() {
                runs.push((start, event.at));
                flagged_since = None;
            }
        }

        if to == "impediment" {
            flagged_since = Some(event.at);
        }
    }

    if let Some(start) = flagged_since {
        runs.push((start, w1));
    }

    runs
}

/// Total intersection of two chronological, disjoint interval lists.
fn merged_overlap(
    a: &[(DateTime<Utc>, DateTime<Utc>)],
    b: &[(DateTime<Utc>, DateTime<Utc>)],
) -> f64 {
    let mut total = 0.0;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        total += overlap_seconds(a[i], b[j]);
        if a[i].1 <= b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{flag, log_from, status};
    use chrono::TimeZone;

    fn vocab() -> StatusVocabulary {
        StatusVocabulary::new(
            &["In Development"],
            &["Done", "Closed"],
            &["Acceptance", "Feedback"],
            false,
        )
        .unwrap()
    }

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    const DAY: f64 = 86_400.0;

    #[test]
    fn test_excluded_time_inside_window() {
        // In Development D1, Acceptance D5..D7, Done D7.
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Acceptance"),
            status(7, 10, "Acceptance", "Done"),
        ]);
        let acc = account_window(&log, &vocab(), utc(1, 11), utc(7, 11));

        assert_eq!(acc.excluded, 2.0 * DAY);
        assert_eq!(acc.impediment, 0.0);
        assert_eq!(acc.active, 4.0 * DAY);
    }

    #[test]
    fn test_excluded_run_clipped_at_window_end() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(5, 10, "In Development", "Acceptance"),
        ]);
        let acc = account_window(&log, &vocab(), utc(1, 11), utc(9, 11));
        assert_eq!(acc.excluded, 4.0 * DAY);
    }

    #[test]
    fn test_impediment_time() {
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            flag(2, 10, "Impediment"),
            flag(4, 10, "None"),
            status(6, 10, "In Development", "Done"),
        ]);
        let acc = account_window(&log, &vocab(), utc(1, 11), utc(6, 11));
        assert_eq!(acc.impediment, 2.0 * DAY);
        assert_eq!(acc.active, 3.0 * DAY);
    }

    #[test]
    fn test_impediment_clear_via_empty_value() {
        let log = log_from(&[flag(2, 10, "Impediment"), flag(3, 10, "")]);
        let acc = account_window(&log, &vocab(), utc(1, 11), utc(6, 11));
        assert_eq!(acc.impediment, 1.0 * DAY);
    }

    #[test]
    fn test_impediment_open_at_window_end() {
        let log = log_from(&[flag(4, 10, "Impediment")]);
        let acc = account_window(&log, &vocab(), utc(1, 11), utc(6, 11));
        assert_eq!(acc.impediment, 2.0 * DAY);
    }

    #[test]
    fn test_overlap_added_back() {
        // Impediment D3..D6 and Feedback D4..D7 overlap during D4..D6.
        let log = log_from(&[
            status(1, 9, "Backlog", "In Development"),
            flag(3, 9, "Impediment"),
            status(4, 9, "In Development", "Feedback"),
            flag(6, 9, "None"),
            status(7, 9, "Feedback", "In Development"),
            status(8, 9, "In Development", "Closed"),
        ]);
        let (w0, w1) = (utc(1, 10), utc(8, 10));
        let acc = account_window(&log, &vocab(), w0, w1);

        assert_eq!(acc.excluded, 3.0 * DAY);
        assert_eq!(acc.impediment, 3.0 * DAY);
        assert_eq!(acc.overlap, 2.0 * DAY);
        assert_eq!(acc.active, 3.0 * DAY);
        // Identity: active + excluded + impediment - overlap == window span.
        let span = duration_seconds(w1 - w0);
        assert!((acc.active + acc.excluded + acc.impediment - acc.overlap - span).abs() < 1e-6);
    }

    #[test]
    fn test_consecutive_excluded_statuses_form_one_run() {
        // Acceptance D2..D4, then Feedback D4..D5: a single excluded run.
        let log = log_from(&[
            status(1, 10, "Backlog", "In Development"),
            status(2, 10, "In Development", "Acceptance"),
            status(4, 10, "Acceptance", "Feedback"),
            status(5, 10, "Feedback", "Done"),
        ]);
        let acc = account_window(&log, &vocab(), utc(1, 11), utc(5, 11));
        assert_eq!(acc.excluded, 3.0 * DAY);
        assert_eq!(acc.active, 1.0 * DAY);
    }

    #[test]
    fn test_window_starting_inside_excluded_status_not_preseeded() {
        // Acceptance entered before the window: no contribution until the
        // next transition seen inside it.
        let log = log_from(&[
            status(1, 10, "In Development", "Acceptance"),
            status(5, 10, "Acceptance", "Done"),
        ]);
        let acc = account_window(&log, &vocab(), utc(3, 0), utc(5, 11));
        assert_eq!(acc.excluded, 0.0);
    }

    #[test]
    fn test_events_outside_window_ignored() {
        let log = log_from(&[
            flag(1, 10, "Impediment"),
            status(2, 10, "Backlog", "Acceptance"),
            status(9, 10, "Acceptance", "Done"),
        ]);
        let acc = account_window(&log, &vocab(), utc(3, 0), utc(4, 0));
        assert_eq!(acc.excluded, 0.0);
        assert_eq!(acc.impediment, 0.0);
        assert_eq!(acc.active, duration_seconds(utc(4, 0) - utc(3, 0)));
    }

    #[test]
    fn test_merged_overlap_disjoint_lists() {
        let a = vec![(utc(1, 0), utc(2, 0)), (utc(5, 0), utc(6, 0))];
        let b = vec![(utc(1, 12), utc(5, 12))];
        let total = merged_overlap(&a, &b);
        assert_eq!(total, 12.0 * 3600.0 + 12.0 * 3600.0);
    }
}
