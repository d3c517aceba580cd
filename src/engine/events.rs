//! Chronological event index over a raw changelog.
//!
//! The tracker returns change-sets unordered and loosely typed. This module
//! parses timestamps, decodes each field change into a closed event kind, and
//! produces a stable chronological view that every downstream component
//! consumes. Entries whose timestamp cannot be parsed are dropped here.

use chrono::{DateTime, Utc};

use crate::models::history::{FieldKind, HistoryEntry};
use crate::models::time::parse_vendor_timestamp;
use crate::models::vocabulary::normalize_status;

use super::EngineOptions;

/// A decoded field change. Status and flag names are trimmed and lowercased
/// at ingest; resolution names keep their original casing (display value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EventKind {
    Status {
        from: String,
        to: String,
    },
    Assignee {
        from: Option<String>,
        to: Option<String>,
    },
    Flagged {
        to: String,
    },
    Resolution {
        to: String,
    },
}

/// One decoded change with its corrected timestamp and author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Event {
    pub at: DateTime<Utc>,
    pub author: Option<String>,
    pub kind: EventKind,
}

impl Event {
    pub fn authored_by(&self, account_id: &str) -> bool {
        self.author.as_deref() == Some(account_id)
    }
}

/// Borrowed view of a status transition.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StatusEvent<'a> {
    pub at: DateTime<Utc>,
    pub author: Option<&'a str>,
    pub from: &'a str,
    pub to: &'a str,
}

/// Chronologically sorted, decoded changelog.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Decode and index a raw changelog.
    ///
    /// Simultaneous events are ordered deterministically: status changes
    /// first (so state-at-assignment reads a co-recorded status change),
    /// then by content. Input order never influences the index, which keeps
    /// results identical for any permutation of the raw history.
    pub fn index(histories: &[HistoryEntry], options: &EngineOptions) -> Self {
        let mut events = Vec::new();

        for entry in histories {
            let Some(raw) = entry.created.as_deref() else {
                continue;
            };
            let Some(at) = parse_vendor_timestamp(raw, options.timestamp_shift) else {
                continue;
            };
            let author = entry.author_account_id().map(str::to_string);

            for item in &entry.items {
                let kind = match FieldKind::classify(&item.field) {
                    FieldKind::Status => EventKind::Status {
                        from: normalize_status(item.from_string.as_deref().unwrap_or_default()),
                        to: normalize_status(item.to_string.as_deref().unwrap_or_default()),
                    },
                    FieldKind::Assignee => EventKind::Assignee {
                        from: non_empty(item.from.as_deref()),
                        to: non_empty(item.to.as_deref()),
                    },
                    FieldKind::Flagged => EventKind::Flagged {
                        to: normalize_status(item.to_string.as_deref().unwrap_or_default()),
                    },
                    FieldKind::Resolution => EventKind::Resolution {
                        to: item.to_string.as_deref().unwrap_or_default().trim().to_string(),
                    },
                    FieldKind::Other => continue,
                };
                events.push(Event {
                    at,
                    author: author.clone(),
                    kind,
                });
            }
        }

        events.sort_by(|a, b| {
            a.at.cmp(&b.at)
                .then_with(|| kind_rank(&a.kind).cmp(&kind_rank(&b.kind)))
                .then_with(|| content_key(&a.kind).cmp(&content_key(&b.kind)))
                .then_with(|| a.author.cmp(&b.author))
        });
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn status_events(&self) -> impl Iterator<Item = StatusEvent<'_>> + '_ {
        self.events.iter().filter_map(|e| match &e.kind {
            EventKind::Status { from, to } => Some(StatusEvent {
                at: e.at,
                author: e.author.as_deref(),
                from: from.as_str(),
                to: to.as_str(),
            }),
            _ => None,
        })
    }

    /// The item's (normalised) status as of `at`, replaying transitions up
    /// to and including that instant.
    pub fn status_at(&self, at: DateTime<Utc>) -> Option<&str> {
        let mut current = None;
        for ev in self.status_events() {
            if ev.at > at {
                break;
            }
            current = Some(ev.to);
        }
        current
    }
}

fn kind_rank(kind: &EventKind) -> u8 {
    match kind {
        EventKind::Status { .. } => 0,
        EventKind::Flagged { .. } => 1,
        EventKind::Resolution { .. } => 2,
        EventKind::Assignee { .. } => 3,
    }
}

fn content_key(kind: &EventKind) -> (&str, &str) {
    match kind {
        EventKind::Status { from, to } => (from.as_str(), to.as_str()),
        EventKind::Assignee { from, to } => (
            from.as_deref().unwrap_or_default(),
            to.as_deref().unwrap_or_default(),
        ),
        EventKind::Flagged { to } => (to.as_str(), ""),
        EventKind::Resolution { to } => (to.as_str(), ""),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
