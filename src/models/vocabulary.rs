//! Status vocabulary configuration.
//!
//! The engine classifies status names into three disjoint sets: in-progress
//! (active work), done (completed), and excluded (time subtracted from the
//! cycle). All comparisons are case-insensitive; names are trimmed and
//! lowercased once at construction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Error raised when a vocabulary violates its construction contract.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum VocabularyError {
    /// The same status name appears in more than one set.
    #[error("status \"{status}\" appears in both the {first} and {second} sets")]
    OverlappingSets {
        status: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Normalise a status or flag name for comparison.
pub fn normalize_status(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The configured status vocabulary.
///
/// Invariants: the three sets are disjoint and hold trimmed lowercase names.
/// Duplicates within a set are collapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusVocabulary {
    in_progress: HashSet<String>,
    done: HashSet<String>,
    excluded: HashSet<String>,
    is_qa: bool,
}

impl StatusVocabulary {
    /// Build a vocabulary, failing fast on overlapping sets.
    pub fn new<S: AsRef<str>>(
        in_progress: &[S],
        done: &[S],
        excluded: &[S],
        is_qa: bool,
    ) -> Result<Self, VocabularyError> {
        let in_progress: HashSet<String> =
            in_progress.iter().map(|s| normalize_status(s.as_ref())).collect();
        let done: HashSet<String> = done.iter().map(|s| normalize_status(s.as_ref())).collect();
        let excluded: HashSet<String> =
            excluded.iter().map(|s| normalize_status(s.as_ref())).collect();

        check_disjoint(&in_progress, "in-progress", &done, "done")?;
        check_disjoint(&in_progress, "in-progress", &excluded, "excluded")?;
        check_disjoint(&done, "done", &excluded, "excluded")?;

        Ok(Self {
            in_progress,
            done,
            excluded,
            is_qa,
        })
    }

    /// True when the (normalised) status counts as active work.
    pub fn is_in_progress(&self, status: &str) -> bool {
        self.in_progress.contains(status)
    }

    /// True when the (normalised) status counts as completed.
    pub fn is_done(&self, status: &str) -> bool {
        self.done.contains(status)
    }

    /// True when time in the (normalised) status is subtracted.
    pub fn is_excluded(&self, status: &str) -> bool {
        self.excluded.contains(status)
    }

    /// Whether the QA start-detection specialisation is active.
    pub fn is_qa(&self) -> bool {
        self.is_qa
    }
}

fn check_disjoint(
    a: &HashSet<String>,
    a_name: &'static str,
    b: &HashSet<String>,
    b_name: &'static str,
) -> Result<(), VocabularyError> {
    if let Some(status) = a.intersection(b).next() {
        return Err(VocabularyError::OverlappingSets {
            status: status.clone(),
            first: a_name,
            second: b_name,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_case_insensitive() {
        let vocab =
            StatusVocabulary::new(&["In Development"], &["Done"], &["Acceptance"], false).unwrap();

        assert!(vocab.is_in_progress(&normalize_status("IN DEVELOPMENT")));
        assert!(vocab.is_done(&normalize_status(" done ")));
        assert!(vocab.is_excluded(&normalize_status("Acceptance")));
        assert!(!vocab.is_in_progress(&normalize_status("Done")));
    }

    #[test]
    fn test_duplicates_collapse() {
        let vocab = StatusVocabulary::new(
            &["In Review", "in review", " In Review "],
            &["Done"],
            &[],
            false,
        )
        .unwrap();
        assert!(vocab.is_in_progress("in review"));
    }

    #[test]
    fn test_overlap_fails_fast() {
        let err = StatusVocabulary::new(&["In Review"], &["in review"], &[], false).unwrap_err();
        match err {
            VocabularyError::OverlappingSets { status, .. } => assert_eq!(status, "in review"),
        }
    }

    #[test]
    fn test_excluded_overlap_detected() {
        assert!(StatusVocabulary::new(&["Dev"], &["Done"], &["done"], false).is_err());
        assert!(StatusVocabulary::new(&["Dev"], &["Done"], &["dev"], false).is_err());
    }
}
