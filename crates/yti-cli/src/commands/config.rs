//! Config command for viewing and updating the config file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::Config;
use crate::config::config_file_path;

/// Prints the resolved configuration with secrets redacted.
pub fn show<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    writeln!(writer, "[connection]")?;
    writeln!(writer, "url = {}", display(config.connection.url.as_deref()))?;
    writeln!(writer, "token = {}", redact(config.connection.token.as_deref()))?;
    writeln!(writer)?;
    writeln!(writer, "[toggl]")?;
    writeln!(writer, "token = {}", redact(config.toggl.token.as_deref()))?;
    writeln!(
        writer,
        "workspace = {}",
        display(config.toggl.workspace.as_deref())
    )?;
    Ok(())
}

/// Sets one option in the config file, creating the file if needed.
///
/// `option` uses dot notation (`section.key`), matching the TOML layout.
pub fn set(config_path: Option<&Path>, option: &str, value: &str) -> Result<()> {
    let path = resolve_path(config_path)?;
    let Some((section, key)) = option.split_once('.') else {
        bail!("option must be section.key (e.g. connection.url), got {option:?}");
    };

    let mut table = read_table(&path)?;
    let entry = table
        .entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(section_table) = entry else {
        bail!("config key {section:?} is not a table");
    };
    section_table.insert(key.to_string(), toml::Value::String(value.to_string()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let rendered = toml::to_string_pretty(&table).context("failed to encode config")?;
    fs::write(&path, rendered).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Set {option} in {}", path.display());
    Ok(())
}

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("failed to determine config directory"),
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    match fs::read_to_string(path) {
        Ok(contents) => contents
            .parse()
            .with_context(|| format!("failed to parse {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(toml::Table::new()),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn display(value: Option<&str>) -> &str {
    value.unwrap_or("(unset)")
}

fn redact(value: Option<&str>) -> &str {
    value.map_or("(unset)", |_| "[REDACTED]")
}
