//! Raw changelog types as returned by the issue tracker.
//!
//! A changelog is a list of [`HistoryEntry`] values, each one atomic change-set
//! with a creation timestamp, an optional author, and the field-level deltas.
//! Entries arrive unordered and loosely typed; the engine decodes them into a
//! closed set of event kinds at index time (see `engine::events`).

use serde::{Deserialize, Serialize};

/// The actor that performed a change-set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable account identifier, if the tracker exposes one.
    #[serde(rename = "accountId", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// One field-level change inside a history entry.
///
/// `from_string`/`to_string` carry human-readable values (status names, flag
/// labels); `from`/`to` carry machine identifiers (account ids for assignee
/// changes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeItem {
    pub field: String,
    #[serde(rename = "fromString", default, skip_serializing_if = "Option::is_none")]
    pub from_string: Option<String>,
    #[serde(rename = "toString", default, skip_serializing_if = "Option::is_none")]
    pub to_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// One atomic change-set from the tracker's changelog.
///
/// An entry with no items is informationally irrelevant except for
/// authorship. Items within an entry share the entry's timestamp; their
/// relative order is not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Vendor timestamp string; normalised by `models::time`.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Actor>,
    #[serde(default)]
    pub items: Vec<ChangeItem>,
}

/// Closed classification of the field kinds the engine understands.
///
/// Anything outside this set is decoded as [`FieldKind::Other`] and dropped
/// at ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Status,
    Assignee,
    Flagged,
    Resolution,
    Other,
}

impl FieldKind {
    /// Classify a raw field name.
    pub fn classify(field: &str) -> Self {
        match field {
            "status" => FieldKind::Status,
            "assignee" => FieldKind::Assignee,
            "Flagged" => FieldKind::Flagged,
            "resolution" => FieldKind::Resolution,
            _ => FieldKind::Other,
        }
    }
}

impl HistoryEntry {
    /// Account id of the entry's author, if present.
    pub fn author_account_id(&self) -> Option<&str> {
        self.author.as_ref()?.account_id.as_deref()
    }
}
