//! Shared fixture builders for the integration test suites.
#![allow(dead_code)]
//!
//! Timestamps are raw vendor strings in March 2024; the engine applies its
//! +1h correction, so an event written at `10:00` lands at `11:00` UTC.

use chrono::{DateTime, TimeZone, Utc};

use cadence_rust::models::history::{Actor, ChangeItem, HistoryEntry};
use cadence_rust::models::StatusVocabulary;

pub const PERSON_A: &str = "person-a-id";
pub const PERSON_B: &str = "person-b-id";
pub const PERSON_C: &str = "person-c-id";

/// Raw vendor timestamp on day `day` of the reference month.
pub fn ts(day: u32, hour: u32, minute: u32) -> String {
    format!("2024-03-{:02}T{:02}:{:02}:00Z", day, hour, minute)
}

/// The corrected instant the engine derives from [`ts`].
pub fn shifted(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap() + chrono::Duration::hours(1)
}

pub fn entry(created: String, author: Option<&str>, items: Vec<ChangeItem>) -> HistoryEntry {
    HistoryEntry {
        created: Some(created),
        author: author.map(|id| Actor {
            account_id: Some(id.to_string()),
        }),
        items,
    }
}

pub fn status_item(from: &str, to: &str) -> ChangeItem {
    ChangeItem {
        field: "status".to_string(),
        from_string: Some(from.to_string()),
        to_string: Some(to.to_string()),
        ..Default::default()
    }
}

pub fn assignee_item(from: Option<&str>, to: Option<&str>) -> ChangeItem {
    ChangeItem {
        field: "assignee".to_string(),
        from: from.map(str::to_string),
        to: to.map(str::to_string),
        ..Default::default()
    }
}

pub fn flag_item(to: &str) -> ChangeItem {
    ChangeItem {
        field: "Flagged".to_string(),
        to_string: Some(to.to_string()),
        ..Default::default()
    }
}

pub fn resolution_item(to: &str) -> ChangeItem {
    ChangeItem {
        field: "resolution".to_string(),
        to_string: Some(to.to_string()),
        ..Default::default()
    }
}

/// Unauthored status change at `day`/`hour`.
pub fn status_change(day: u32, hour: u32, from: &str, to: &str) -> HistoryEntry {
    entry(ts(day, hour, 0), None, vec![status_item(from, to)])
}

/// Status change authored by `author`.
pub fn status_change_by(day: u32, hour: u32, from: &str, to: &str, author: &str) -> HistoryEntry {
    entry(ts(day, hour, 0), Some(author), vec![status_item(from, to)])
}

/// Assignee change, authored by the incoming assignee.
pub fn assignee_change(day: u32, hour: u32, from: Option<&str>, to: Option<&str>) -> HistoryEntry {
    entry(ts(day, hour, 0), to, vec![assignee_item(from, to)])
}

/// Flag change (`Impediment`, `None`, or empty).
pub fn flag_change(day: u32, hour: u32, to: &str) -> HistoryEntry {
    entry(ts(day, hour, 0), None, vec![flag_item(to)])
}

/// The default vocabulary used throughout the suites.
pub fn default_vocabulary() -> StatusVocabulary {
    StatusVocabulary::new(
        &["In Development", "In Review"],
        &["Done", "Closed"],
        &["Acceptance"],
        false,
    )
    .unwrap()
}

pub const DAY_SECONDS: f64 = 86_400.0;

/// Assert two second counts agree to within one second.
pub fn assert_seconds_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1.0,
        "expected ~{} seconds, got {}",
        expected,
        actual
    );
}
