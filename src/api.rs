//! Public API surface for the cycle-time backend.
//!
//! This file consolidates the identifier newtypes and re-exports the DTO
//! types produced and consumed by the engine and the service layer. All
//! types derive Serialize/Deserialize for JSON serialization.

use serde::{Deserialize, Serialize};

pub use crate::engine::{CycleTime, CycleTimeEngine, EngineOptions, StrategyDecision, StrategyKind};
pub use crate::models::{StatusVocabulary, TimeWindow, VocabularyError, WindowError};
pub use crate::services::report::{CycleTimeReport, ReportRequest};
pub use crate::services::stats::CycleTimeSummary;

/// Work-item key in the remote tracker (e.g. `PROJ-123`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueKey(pub String);

/// Stable account identifier of a worker in the remote tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl IssueKey {
    pub fn new(value: impl Into<String>) -> Self {
        IssueKey(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AccountId {
    pub fn new(value: impl Into<String>) -> Self {
        AccountId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IssueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IssueKey {
    fn from(value: &str) -> Self {
        IssueKey::new(value)
    }
}
impl From<String> for IssueKey {
    fn from(value: String) -> Self {
        IssueKey::new(value)
    }
}
impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        AccountId::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key_roundtrip() {
        let key = IssueKey::new("PROJ-42");
        assert_eq!(key.as_str(), "PROJ-42");
        assert_eq!(key.to_string(), "PROJ-42");

        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"PROJ-42\"");
        let back: IssueKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_account_id_from_str() {
        let id: AccountId = "acc-1".into();
        assert_eq!(id.as_str(), "acc-1");
    }
}
