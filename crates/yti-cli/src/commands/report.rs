//! Report command: per-day listing of the user's work items.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Local, NaiveDate};
use clap::Args;

use yti_core::{ExistingWorkItem, IssueKey, TrackerGateway};
use yti_sources::date_range::{resolve_since, resolve_until};
use yti_youtrack::Client;

use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Start date (YYYY-MM-DD or a named range).
    pub since: String,

    /// End date (YYYY-MM-DD or a named range).
    pub until: String,
}

pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let (url, token) = config.youtrack_connection()?;
    let client = Client::connect(url, token).context("failed to connect to YouTrack")?;

    let today = Local::now().date_naive();
    let since = resolve_since(&args.since, today)?;
    let until = resolve_until(&args.until, today)?;

    let rows = collect_rows(&client, since, until)?;
    render(writer, rows)
}

/// Work items by the current user in the date window, tagged with their
/// issue key.
fn collect_rows(
    client: &Client,
    since: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<(String, ExistingWorkItem)>> {
    let login = client.current_user_login().to_string();
    let since_arg = since.format("%Y-%m-%d").to_string();
    let until_arg = until.format("%Y-%m-%d").to_string();
    let start_ms = day_start_ms(since);
    let end_ms = day_start_ms(until + Days::new(1));

    let mut rows = Vec::new();
    for key in client.issues_updated_between(&since_arg, &until_arg, &login)? {
        let Ok(issue) = IssueKey::new(key.as_str()) else {
            continue;
        };
        for item in client.get_work_items(&issue)? {
            if item.author_login == login && item.date_ms >= start_ms && item.date_ms < end_ms {
                rows.push((key.clone(), item));
            }
        }
    }
    Ok(rows)
}

fn day_start_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis()
}

fn render<W: Write>(writer: &mut W, mut rows: Vec<(String, ExistingWorkItem)>) -> Result<()> {
    if rows.is_empty() {
        writeln!(writer, "No work items recorded.")?;
        return Ok(());
    }
    rows.sort_by_key(|(_, item)| item.date_ms);

    let mut previous_day: Option<String> = None;
    for (issue, item) in &rows {
        let Some(start) = DateTime::from_timestamp_millis(item.date_ms) else {
            continue;
        };
        let day = start.format("%Y-%m-%d").to_string();
        if previous_day.as_deref() != Some(day.as_str()) {
            if previous_day.is_some() {
                writeln!(writer)?;
            }
            writeln!(writer, "{day}")?;
            previous_day = Some(day);
        }
        writeln!(
            writer,
            "  {} - {issue} - {}",
            start.format("%H:%M"),
            format_minutes(item.duration_minutes)
        )?;
    }
    Ok(())
}

fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(author: &str, date_ms: i64, duration_minutes: i64) -> ExistingWorkItem {
        ExistingWorkItem {
            author_login: author.to_string(),
            date_ms,
            duration_minutes,
        }
    }

    #[test]
    fn format_minutes_switches_units_at_an_hour() {
        assert_eq!(format_minutes(14), "14m");
        assert_eq!(format_minutes(60), "1h 00m");
        assert_eq!(format_minutes(205), "3h 25m");
    }

    #[test]
    fn render_groups_items_by_day_in_order() {
        let rows = vec![
            ("BCSM-16".to_string(), item("matthew", 1_412_690_700_000, 30)),
            ("BCSM-15".to_string(), item("matthew", 1_412_604_300_000, 205)),
        ];

        let mut output = Vec::new();
        render(&mut output, rows).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "2014-10-06\n  15:05 - BCSM-15 - 3h 25m\n\n2014-10-07\n  15:05 - BCSM-16 - 30m\n"
        );
    }

    #[test]
    fn render_reports_empty_window() {
        let mut output = Vec::new();
        render(&mut output, Vec::new()).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No work items recorded.\n");
    }

    #[test]
    fn day_bounds_are_utc_midnights() {
        let date = NaiveDate::from_ymd_opt(2014, 10, 6).unwrap();
        assert_eq!(day_start_ms(date), 1_412_550_000_000);
    }
}
