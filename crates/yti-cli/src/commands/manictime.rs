//! ManicTime import command.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::Config;
use crate::commands::util;

#[derive(Debug, Args)]
pub struct ManictimeArgs {
    /// Path to the ManicTime CSV export.
    pub file: PathBuf,

    /// Walk the full run without creating work items.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &ManictimeArgs, config: &Config) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let entries = yti_sources::manictime::load(file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    util::import_entries(entries, config, args.dry_run)?;
    Ok(())
}
