//! Duplicate detection against work items already on the tracker.

use crate::entry::TimeEntry;
use crate::gateway::TrackerGateway;

/// Whether the entry's work item already exists on its issue.
///
/// An existing item is a duplicate iff it matches the candidate on all of
/// (author login, date, duration). Detection fails open: an entry with no
/// issue id, or any gateway failure while listing work items, yields
/// "not a duplicate" so the reconciliation loop proceeds to a submission
/// attempt, which surfaces the real failure class.
pub fn is_duplicate<G: TrackerGateway>(gateway: &G, entry: &TimeEntry) -> bool {
    let Some(issue) = entry.issue_id() else {
        return false;
    };

    let existing = match gateway.get_work_items(issue) {
        Ok(items) => items,
        Err(err) => {
            tracing::debug!(issue = %issue, error = %err, "duplicate check failed open");
            return false;
        }
    };

    let candidate = entry.work_item();
    let login = gateway.current_user_login();
    existing.iter().any(|item| item.matches(login, &candidate))
}
