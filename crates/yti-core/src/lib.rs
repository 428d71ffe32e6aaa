//! Core reconciliation logic for the YouTrack time importer.
//!
//! This crate contains the source-agnostic heart of the importer:
//! - Normalized time entries derived from ManicTime/Toggl records
//! - Lexical and interactive issue resolution
//! - Duplicate detection against work items already on the tracker
//! - The per-entry reconciliation state machine and run statistics
//!
//! I/O lives elsewhere: source adapters produce [`TimeEntry`] batches, the
//! tracker is consumed through the [`TrackerGateway`] trait, and operator
//! interaction goes through the [`Console`] trait.

pub mod console;
mod duplicate;
mod entry;
mod gateway;
mod issue;
mod reconcile;
mod resolver;
mod work_item;

pub use console::Console;
pub use duplicate::is_duplicate;
pub use entry::{
    EntryError, SourceKind, TimeEntry, duration_minutes_from_clock, duration_minutes_from_millis,
};
pub use gateway::{TrackerError, TrackerGateway};
pub use issue::{IssueKey, IssueKeyError, find_issue_key};
pub use reconcile::{ReconcileError, ReconcileOptions, RunReport, RunStats, reconcile};
pub use resolver::{ResolutionOutcome, resolve_interactively};
pub use work_item::{ExistingWorkItem, WorkItem};
