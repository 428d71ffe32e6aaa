//! Work item payloads exchanged with the tracker.

use serde::{Deserialize, Serialize};

/// A work item to be created on a tracker issue.
///
/// All three fields are mandatory for a submission; the tracker rejects
/// payloads with an empty description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Short description of the time entry.
    pub description: String,
    /// Duration of the time entry in minutes.
    pub duration_minutes: i64,
    /// Start of the time entry as Unix epoch milliseconds (UTC).
    pub date_ms: i64,
}

/// A work item already present on a tracker issue.
///
/// Numeric fields are normalized to integers at the gateway boundary, so
/// duplicate comparison never sees text-vs-number mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingWorkItem {
    /// Login of the user who recorded the item.
    pub author_login: String,
    /// Start of the item as Unix epoch milliseconds (UTC).
    pub date_ms: i64,
    /// Duration of the item in minutes.
    pub duration_minutes: i64,
}

impl ExistingWorkItem {
    /// True when this item duplicates the candidate for the given author.
    ///
    /// The match is exact on all of (author, date, duration); changing any
    /// one field makes the candidate a distinct work item.
    pub fn matches(&self, author_login: &str, candidate: &WorkItem) -> bool {
        self.author_login == author_login
            && self.date_ms == candidate.date_ms
            && self.duration_minutes == candidate.duration_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> WorkItem {
        WorkItem {
            description: "Support new presences in code".to_string(),
            duration_minutes: 205,
            date_ms: 1_412_604_300_000,
        }
    }

    fn existing() -> ExistingWorkItem {
        ExistingWorkItem {
            author_login: "matthew".to_string(),
            date_ms: 1_412_604_300_000,
            duration_minutes: 205,
        }
    }

    #[test]
    fn matches_on_exact_triple() {
        assert!(existing().matches("matthew", &candidate()));
    }

    #[test]
    fn mismatch_on_any_field() {
        assert!(!existing().matches("other", &candidate()));

        let mut shifted = candidate();
        shifted.date_ms += 1;
        assert!(!existing().matches("matthew", &shifted));

        let mut longer = candidate();
        longer.duration_minutes += 1;
        assert!(!existing().matches("matthew", &longer));
    }

    #[test]
    fn description_does_not_affect_matching() {
        let mut renamed = candidate();
        renamed.description = "something else".to_string();
        assert!(existing().matches("matthew", &renamed));
    }
}
