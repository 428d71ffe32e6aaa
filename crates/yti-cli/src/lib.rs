//! YouTrack time importer CLI.
//!
//! This crate provides the `yti` binary: argument parsing, configuration,
//! the stdin/stdout operator console, and the import/report commands.

mod cli;
pub mod commands;
pub mod config;
mod console;

pub use cli::{Cli, Commands, ConfigAction};
pub use config::Config;
pub use console::StdConsole;
