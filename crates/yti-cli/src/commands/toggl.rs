//! Toggl import command: CSV export or the Reports API.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use yti_sources::date_range::{DateRange, resolve_since, resolve_until};
use yti_sources::toggl::{self, ReportsClient};

use crate::Config;
use crate::commands::util;

/// Tag added to Toggl entries that were turned into work items.
const SUBMITTED_TAG: &str = "youtracked";

#[derive(Debug, Args)]
pub struct TogglArgs {
    /// Path to a Toggl detailed CSV export; pulls from the Reports API
    /// when omitted.
    pub file: Option<PathBuf>,

    /// Start of the report range (YYYY-MM-DD or a named range).
    #[arg(short, long, default_value = "yesterday")]
    pub since: String,

    /// End of the report range (YYYY-MM-DD or a named range).
    #[arg(short, long, default_value = "yesterday")]
    pub until: String,

    /// Walk the full run without creating work items.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &TogglArgs, config: &Config) -> Result<()> {
    if let Some(path) = &args.file {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let entries = toggl::load_csv(file)
            .with_context(|| format!("failed to load {}", path.display()))?;
        util::import_entries(entries, config, args.dry_run)?;
        return Ok(());
    }

    let (token, workspace) = config.toggl_api()?;
    let today = Local::now().date_naive();
    let range = DateRange {
        since: resolve_since(&args.since, today)?,
        until: resolve_until(&args.until, today)?,
    };

    let client = ReportsClient::new(token, workspace)?;
    let entries = client
        .fetch(range)
        .context("failed to fetch entries from Toggl")?;
    let report = util::import_entries(entries, config, args.dry_run)?;

    // Mark what was just submitted so the entries are recognizable on the
    // Toggl side; a tagging failure is not worth failing the import over.
    if !args.dry_run && !report.submitted_record_ids.is_empty() {
        if let Err(err) = client.tag_entries(&report.submitted_record_ids, SUBMITTED_TAG) {
            tracing::warn!(error = %err, "failed to tag submitted toggl entries");
        }
    }
    Ok(())
}
