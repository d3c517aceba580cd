//! Assignment intervals and interval arithmetic.
//!
//! Reconstructs the periods during which a given worker owned the item from
//! sparse `from → to` assignee events, and provides the membership predicate
//! used to confine status transitions to those periods.

use chrono::{DateTime, Duration, Utc};

use super::events::{EventKind, EventLog};

/// A half-open ownership period. `end == None` means still assigned at the
/// time of computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

/// Fold assignee events into the ownership intervals of `worker`.
///
/// Single pass over the sorted log: an event assigning the worker opens an
/// interval, an event moving the assignment elsewhere (or clearing it) closes
/// the open one. A trailing open interval is emitted with no end.
pub(crate) fn assignment_intervals(log: &EventLog, worker: &str) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut current: Option<String> = None;
    let mut open_start: Option<DateTime<Utc>> = None;

    for event in log.events() {
        let EventKind::Assignee { to, .. } = &event.kind else {
            continue;
        };

        let worker_owns = current.as_deref() == Some(worker);
        let assigns_worker = to.as_deref() == Some(worker);

        if worker_owns && !assigns_worker {
            if let Some(start) = open_start.take() {
                intervals.push(Interval {
                    start,
                    end: Some(event.at),
                });
            }
            current = to.clone();
        } else if assigns_worker {
            current = Some(worker.to_string());
            open_start = Some(event.at);
        }
    }

    if current.as_deref() == Some(worker) {
        if let Some(start) = open_start {
            intervals.push(Interval { start, end: None });
        }
    }

    intervals
}

/// Membership predicate with the hand-off grace rule.
///
/// `None` intervals mean "no filtering". An instant past a closed interval's
/// end still counts when it falls on the same calendar day and within
/// `grace` of the end: status transitions frequently fire moments after a
/// hand-off event and belong to the outgoing worker.
pub(crate) fn is_within(
    at: DateTime<Utc>,
    intervals: Option<&[Interval]>,
    grace: Duration,
) -> bool {
    let Some(intervals) = intervals else {
        return true;
    };

    for interval in intervals {
        match interval.end {
            None => {
                if at >= interval.start {
                    return true;
                }
            }
            Some(end) => {
                if at >= interval.start && at <= end {
                    return true;
                }
                if at > end && at.date_naive() == end.date_naive() && at - end <= grace {
                    return true;
                }
            }
        }
    }

    false
}

/// Earliest interval start, if any.
pub(crate) fn first_start(intervals: &[Interval]) -> Option<DateTime<Utc>> {
    intervals.iter().map(|i| i.start).min()
}

/// Seconds in the intersection of two closed ranges, zero when disjoint.
pub(crate) fn overlap_seconds(
    a: (DateTime<Utc>, DateTime<Utc>),
    b: (DateTime<Utc>, DateTime<Utc>),
) -> f64 {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if lo < hi {
        duration_seconds(hi - lo)
    } else {
        0.0
    }
}

/// Duration as fractional seconds.
pub(crate) fn duration_seconds(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}
