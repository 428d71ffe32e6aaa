//! Issue keys and lexical extraction from entry text.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Matches tracker keys of the form `PROJECT-NUMBER` anywhere in a string.
static ISSUE_KEY_FINDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+-[0-9]+").unwrap());

/// Matches a string that is exactly one tracker key.
static ISSUE_KEY_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+-[0-9]+$").unwrap());

/// Validation errors for issue keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueKeyError {
    /// The provided value was empty.
    #[error("issue key cannot be empty")]
    Empty,

    /// The value does not have the `PROJECT-NUMBER` shape.
    #[error("not a valid issue key: {value}")]
    Invalid { value: String },
}

/// A validated tracker issue key (e.g. `BCSM-15`).
///
/// Keys are `PROJECT-NUMBER`, where the project part is alphanumeric and the
/// number part is decimal. Case is preserved exactly as provided.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueKey(String);

impl IssueKey {
    /// Creates a new key after validating its shape.
    pub fn new(key: impl Into<String>) -> Result<Self, IssueKeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(IssueKeyError::Empty);
        }
        if !ISSUE_KEY_EXACT.is_match(&key) {
            return Err(IssueKeyError::Invalid { value: key });
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the project part of the key (`BCSM` for `BCSM-15`).
    pub fn project(&self) -> &str {
        // Validated shape guarantees the dash is present.
        self.0.rsplit_once('-').map_or(self.0.as_str(), |(p, _)| p)
    }
}

impl TryFrom<String> for IssueKey {
    type Error = IssueKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IssueKey> for String {
    fn from(key: IssueKey) -> Self {
        key.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Finds the first issue key embedded in free-form text.
///
/// This is purely lexical: a match carries no guarantee that the issue
/// exists on the tracker. Returns `None` when no key-shaped substring is
/// present.
pub fn find_issue_key(text: &str) -> Option<IssueKey> {
    ISSUE_KEY_FINDER
        .find(text)
        .map(|m| IssueKey(m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_key_rejects_empty() {
        assert_eq!(IssueKey::new(""), Err(IssueKeyError::Empty));
    }

    #[test]
    fn issue_key_rejects_malformed() {
        assert!(IssueKey::new("BCSM").is_err());
        assert!(IssueKey::new("BCSM-").is_err());
        assert!(IssueKey::new("-15").is_err());
        assert!(IssueKey::new("BCSM-15 extra").is_err());
        assert!(IssueKey::new("BCSM-15").is_ok());
    }

    #[test]
    fn issue_key_project_part() {
        let key = IssueKey::new("BCSM-15").unwrap();
        assert_eq!(key.project(), "BCSM");
    }

    #[test]
    fn find_returns_first_match_case_preserved() {
        let key = find_issue_key("BCSM, BCSM-15").unwrap();
        assert_eq!(key.as_str(), "BCSM-15");

        let key = find_issue_key("worked on bcsm-7 and BCSM-8").unwrap();
        assert_eq!(key.as_str(), "bcsm-7");
    }

    #[test]
    fn find_returns_none_without_match() {
        assert!(find_issue_key("Nothing Here, See Nothing").is_none());
        assert!(find_issue_key("").is_none());
    }

    #[test]
    fn issue_key_serde_roundtrip() {
        let key = IssueKey::new("ABC-123").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"ABC-123\"");
        let parsed: IssueKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
