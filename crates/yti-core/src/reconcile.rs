//! The per-entry reconciliation state machine and run statistics.
//!
//! Entries are processed strictly sequentially in source order. Each entry
//! moves `START -> (IGNORED | RESOLVING -> (SUBMITTED | DUPLICATE | IGNORED
//! | FAILED))`; connection-class tracker failures abort the whole batch.

use std::fmt;

use thiserror::Error;

use crate::console::Console;
use crate::duplicate::is_duplicate;
use crate::entry::TimeEntry;
use crate::gateway::{TrackerError, TrackerGateway};
use crate::issue::IssueKey;
use crate::resolver::{ResolutionOutcome, resolve_interactively};

/// Fatal failures that abort a batch run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The tracker became unreachable (transport or auth failure).
    #[error("unable to connect to the tracker: {0}")]
    Connection(#[source] TrackerError),

    /// Operator input could not be read.
    #[error("operator input failed: {0}")]
    Input(#[from] std::io::Error),
}

/// Tuning knobs for a reconciliation run.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Upper bound on interactive correction rounds per entry.
    pub max_attempts: usize,
    /// Walk the full state machine but never create work items.
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            dry_run: false,
        }
    }
}

/// Counters accumulated over one pass of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Entries processed in total.
    pub processed: usize,
    /// Entries skipped: tagged ignore, declined, or resolution aborted.
    pub ignored: usize,
    /// Work items created on the tracker.
    pub created: usize,
    /// Entries whose work item already existed.
    pub duplicate: usize,
    /// Entries rejected for incomplete work item data.
    pub failed: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed {} time entries.", self.processed)?;
        writeln!(f, "  Ignored: {}.", self.ignored)?;
        writeln!(f, "  Error: {}.", self.failed)?;
        writeln!(f, "  Duplicate: {}.", self.duplicate)?;
        write!(f, "  Created: {}.", self.created)
    }
}

/// Outcome of one full batch run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Final counters.
    pub stats: RunStats,
    /// Source record ids of created entries (Toggl API only), for later
    /// bulk tagging by the caller.
    pub submitted_record_ids: Vec<String>,
}

/// Terminal state of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryOutcome {
    Ignored,
    Created,
    Duplicate,
    Failed,
}

/// Reconciles a batch of entries against the tracker.
///
/// Emits a status line through the console for every transition. Returns
/// the accumulated statistics and submitted record ids, or a fatal error
/// when the tracker connection is lost or operator input fails.
pub fn reconcile<G, C>(
    gateway: &G,
    console: &mut C,
    entries: Vec<TimeEntry>,
    options: &ReconcileOptions,
) -> Result<RunReport, ReconcileError>
where
    G: TrackerGateway,
    C: Console,
{
    let mut report = RunReport::default();
    for entry in entries {
        report.stats.processed += 1;
        match reconcile_entry(gateway, console, entry, options, &mut report)? {
            EntryOutcome::Ignored => report.stats.ignored += 1,
            EntryOutcome::Created => report.stats.created += 1,
            EntryOutcome::Duplicate => report.stats.duplicate += 1,
            EntryOutcome::Failed => report.stats.failed += 1,
        }
    }
    Ok(report)
}

fn reconcile_entry<G, C>(
    gateway: &G,
    console: &mut C,
    mut entry: TimeEntry,
    options: &ReconcileOptions,
    report: &mut RunReport,
) -> Result<EntryOutcome, ReconcileError>
where
    G: TrackerGateway,
    C: Console,
{
    if entry.is_ignored() {
        console.message(&format!("Ignored: time entry for {}", entry.summary()));
        return Ok(EntryOutcome::Ignored);
    }

    // Initial pass plus up to max_attempts correction rounds; resolution
    // loops back to the duplicate check with the corrected key.
    for _ in 0..=options.max_attempts {
        if is_duplicate(gateway, &entry) {
            console.message(&format!("Duplicate: time entry for {}", entry.summary()));
            return Ok(EntryOutcome::Duplicate);
        }

        // A missing issue id is not an error; it just needs resolution.
        let Some(issue) = entry.issue_id().cloned() else {
            match resolve_interactively(gateway, console, &entry, options.max_attempts)? {
                ResolutionOutcome::Resolved(key) => {
                    entry = entry.with_issue_id(key);
                    continue;
                }
                ResolutionOutcome::Aborted => {
                    console.message(&format!("Ignored: time entry for {}", entry.summary()));
                    return Ok(EntryOutcome::Ignored);
                }
            }
        };

        match submit_work_item(gateway, &issue, &entry, options.dry_run) {
            Ok(()) => {
                console.message(&format!("Created: time entry for {}", entry.summary()));
                if let Some(id) = entry.record_id() {
                    report.submitted_record_ids.push(id.to_string());
                }
                return Ok(EntryOutcome::Created);
            }
            Err(TrackerError::IssueNotFound { .. }) => {
                console.message(&format!(
                    "Could not upload time entry for {}",
                    entry.summary()
                ));
                console.message("  Error: no issue found or issue id incorrect");
                match resolve_interactively(gateway, console, &entry, options.max_attempts)? {
                    ResolutionOutcome::Resolved(key) => entry = entry.with_issue_id(key),
                    ResolutionOutcome::Aborted => {
                        console.message(&format!("Ignored: time entry for {}", entry.summary()));
                        return Ok(EntryOutcome::Ignored);
                    }
                }
            }
            Err(TrackerError::MalformedWorkItem { message }) => {
                console.message(&format!(
                    "Could not upload time entry for {}",
                    entry.summary()
                ));
                console.message(&format!("  Error: {message}"));
                return Ok(EntryOutcome::Failed);
            }
            Err(err @ TrackerError::Connection { .. }) => {
                console.message(&format!(
                    "Could not upload time entry for {}",
                    entry.summary()
                ));
                return Err(ReconcileError::Connection(err));
            }
        }
    }

    console.message(&format!(
        "Ignored: time entry for {} (no valid issue after {} correction rounds)",
        entry.summary(),
        options.max_attempts
    ));
    Ok(EntryOutcome::Ignored)
}

fn submit_work_item<G: TrackerGateway>(
    gateway: &G,
    issue: &IssueKey,
    entry: &TimeEntry,
    dry_run: bool,
) -> Result<(), TrackerError> {
    if dry_run {
        tracing::debug!(issue = %issue, "dry run, skipping work item creation");
        return Ok(());
    }
    gateway.create_work_item(issue, &entry.work_item())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_render_as_summary_block() {
        let stats = RunStats {
            processed: 7,
            ignored: 2,
            created: 3,
            duplicate: 1,
            failed: 1,
        };
        let rendered = stats.to_string();
        assert_eq!(
            rendered,
            "Processed 7 time entries.\n  Ignored: 2.\n  Error: 1.\n  Duplicate: 1.\n  Created: 3."
        );
    }

    #[test]
    fn default_options_bound_the_interactive_loop() {
        let options = ReconcileOptions::default();
        assert_eq!(options.max_attempts, 5);
        assert!(!options.dry_run);
    }
}
