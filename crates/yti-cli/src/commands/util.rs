//! Shared plumbing for the import commands.

use anyhow::{Context, Result};

use yti_core::{ReconcileOptions, RunReport, TimeEntry, reconcile};

use crate::Config;
use crate::console::StdConsole;

/// Reconciles a loaded batch against the configured YouTrack instance and
/// prints the closing summary.
pub fn import_entries(
    entries: Vec<TimeEntry>,
    config: &Config,
    dry_run: bool,
) -> Result<RunReport> {
    let (url, token) = config.youtrack_connection()?;
    let gateway =
        yti_youtrack::Client::connect(url, token).context("failed to connect to YouTrack")?;

    let options = ReconcileOptions {
        dry_run,
        ..Default::default()
    };
    let mut console = StdConsole;
    let report = reconcile(&gateway, &mut console, entries, &options)?;

    println!("{}", report.stats);
    Ok(report)
}
