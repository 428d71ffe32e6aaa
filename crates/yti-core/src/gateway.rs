//! The tracker gateway boundary consumed by the reconciliation engine.

use thiserror::Error;

use crate::issue::IssueKey;
use crate::work_item::{ExistingWorkItem, WorkItem};

/// Failures surfaced by a tracker gateway.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The issue does not exist on the tracker.
    ///
    /// Resolvable: the engine hands the entry to the interactive issue
    /// resolver instead of failing it.
    #[error("issue {issue} not found")]
    IssueNotFound { issue: String },

    /// The submitted work item is missing required fields.
    ///
    /// Terminal for the entry: a data defect cannot be fixed by re-prompting.
    #[error("work item rejected: {message}")]
    MalformedWorkItem { message: String },

    /// Transport or authentication failure talking to the tracker.
    ///
    /// Fatal for the whole batch run.
    #[error("tracker connection failed: {message}")]
    Connection { message: String },
}

/// Read/create operations on tracker work items.
///
/// Implemented over the YouTrack REST API in production and by in-memory
/// fakes in tests; the engine only ever sees this trait.
pub trait TrackerGateway {
    /// Login of the authenticated user submitting work items.
    fn current_user_login(&self) -> &str;

    /// All work items currently recorded on the issue.
    fn get_work_items(&self, issue: &IssueKey) -> Result<Vec<ExistingWorkItem>, TrackerError>;

    /// Creates a work item on the issue.
    fn create_work_item(&self, issue: &IssueKey, item: &WorkItem) -> Result<(), TrackerError>;

    /// Whether an issue with this key exists on the tracker.
    fn issue_exists(&self, issue: &IssueKey) -> Result<bool, TrackerError>;

    /// Whether a project with this identifier exists on the tracker.
    fn project_exists(&self, project: &str) -> Result<bool, TrackerError>;
}
