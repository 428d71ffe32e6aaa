//! Interactive issue resolution.
//!
//! Invoked when an entry has no issue key or the tracker reports its key
//! does not exist. The operator either assigns the entry to a real issue or
//! declines, in which case the entry is skipped.

use std::io;

use crate::console::Console;
use crate::entry::TimeEntry;
use crate::gateway::TrackerGateway;
use crate::issue::IssueKey;

/// Result of an interactive resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The operator supplied an issue key that exists on the tracker.
    Resolved(IssueKey),
    /// The operator declined, left a prompt blank, or ran out of attempts.
    Aborted,
}

/// Asks the operator for a valid issue for the entry.
///
/// The operator first confirms they want to assign the entry at all. Then,
/// while no project is associated, they are prompted for a project
/// identifier, and after that for an issue identifier; each answer is
/// validated against the tracker, and invalid input re-prompts with an
/// error message. A blank answer aborts. Tracker lookup failures are
/// reported and the prompt repeats; they never terminate the batch.
///
/// The prompt loop is bounded by `max_attempts` so non-interactive
/// contexts can never spin forever; exhausting it aborts the resolution.
///
/// Only console I/O failures propagate as errors.
pub fn resolve_interactively<G, C>(
    gateway: &G,
    console: &mut C,
    entry: &TimeEntry,
    max_attempts: usize,
) -> io::Result<ResolutionOutcome>
where
    G: TrackerGateway,
    C: Console,
{
    let wants_issue = console.confirm(&format!(
        "  No issue found for \"{}\". Add to an issue?",
        entry.summary()
    ))?;
    if !wants_issue {
        return Ok(ResolutionOutcome::Aborted);
    }

    // The entry's own key may already name a real project even though the
    // issue itself was wrong; in that case skip the project prompt.
    let mut project: Option<String> = match entry.issue_id().map(IssueKey::project) {
        Some(prefix) if gateway.project_exists(prefix).unwrap_or(false) => {
            Some(prefix.to_string())
        }
        _ => None,
    };

    for _ in 0..max_attempts {
        if project.is_none() {
            let input = console.prompt(&format!(
                "  Enter project id for {} [leave blank to skip]",
                entry.summary()
            ))?;
            let input = input.trim();
            if input.is_empty() {
                return Ok(ResolutionOutcome::Aborted);
            }
            match gateway.project_exists(input) {
                Ok(true) => project = Some(input.to_string()),
                Ok(false) => console.message(&format!(
                    "    Could not find project with id {input}. Please try again."
                )),
                Err(err) => console.message(&format!(
                    "    Project lookup failed: {err}. Please try again."
                )),
            }
            continue;
        }

        let input = console.prompt(&format!(
            "  Enter issue id for {} [leave blank to skip]",
            entry.summary()
        ))?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(ResolutionOutcome::Aborted);
        }
        let Ok(key) = IssueKey::new(input) else {
            console.message(&format!(
                "    {input} is not a valid issue id. Please try again."
            ));
            continue;
        };
        match gateway.issue_exists(&key) {
            Ok(true) => return Ok(ResolutionOutcome::Resolved(key)),
            Ok(false) => console.message(&format!(
                "    Could not find issue with id {key}. Please try again."
            )),
            Err(err) => {
                console.message(&format!("    Issue lookup failed: {err}. Please try again."));
            }
        }
    }

    console.message("  No valid issue id after repeated attempts. Skipping this entry.");
    Ok(ResolutionOutcome::Aborted)
}
