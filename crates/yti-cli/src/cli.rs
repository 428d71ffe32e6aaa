//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{manictime::ManictimeArgs, report::ReportArgs, toggl::TogglArgs};

/// Imports tracked time into YouTrack work items.
///
/// Reads ManicTime or Toggl time entries, matches each one to a tracker
/// issue (from an embedded key, or by asking), skips entries already
/// submitted, and creates the rest as work items.
#[derive(Debug, Parser)]
#[command(name = "yti", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a ManicTime CSV export.
    Manictime(ManictimeArgs),

    /// Import Toggl entries from a CSV export or the Reports API.
    Toggl(TogglArgs),

    /// Show the current user's work items per day.
    Report(ReportArgs),

    /// View or update configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration.
    Show,

    /// Set a config option (dot notation, e.g. connection.url).
    Set {
        /// Option name as section.key.
        option: String,
        /// Value to store.
        value: String,
    },
}
