//! Normalized time entries and their derivation from raw source records.
//!
//! Every source (ManicTime CSV, Toggl CSV, Toggl Reports API) produces the
//! same [`TimeEntry`] shape. Derivation happens once at construction from
//! the raw field map; the only later change is an explicit issue-id
//! override, which produces a new value instead of mutating in place.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::issue::{IssueKey, find_issue_key};
use crate::work_item::WorkItem;

/// Errors deriving a normalized entry from a raw record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// A field required for derivation was absent from the raw record.
    #[error("{kind} record is missing field {field:?}")]
    MissingField {
        kind: SourceKind,
        field: &'static str,
    },

    /// The duration representation could not be parsed.
    #[error("cannot parse duration {value:?}")]
    BadDuration { value: String },

    /// The start date/time could not be parsed with the source's format.
    #[error("cannot parse start time {value:?} with format {format:?}")]
    BadTimestamp {
        value: String,
        format: &'static str,
    },
}

/// The source a raw record came from.
///
/// Sources differ only in field names, datetime format, and duration
/// representation; the reconciliation engine never branches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// ManicTime tag CSV export.
    ManicTime,
    /// Toggl detailed CSV export.
    TogglCsv,
    /// Toggl Reports API details endpoint.
    TogglApi,
}

impl SourceKind {
    /// The datetime format string for this source's start fields.
    pub const fn datetime_format(self) -> &'static str {
        match self {
            Self::ManicTime => "%d/%m/%Y %H:%M:%S",
            Self::TogglCsv => "%Y-%m-%d %H:%M:%S",
            Self::TogglApi => "%Y-%m-%dT%H:%M:%S",
        }
    }

    /// The field holding ignorable tags.
    pub const fn ignore_field(self) -> &'static str {
        match self {
            Self::ManicTime => "Name",
            Self::TogglCsv => "Tags",
            Self::TogglApi => "tags",
        }
    }

    /// The field holding the human-readable description.
    const fn description_field(self) -> &'static str {
        match self {
            Self::ManicTime => "Notes",
            Self::TogglCsv => "Description",
            Self::TogglApi => "description",
        }
    }

    /// The field searched for an embedded issue key.
    const fn issue_text_field(self) -> &'static str {
        match self {
            Self::ManicTime => "Name",
            Self::TogglCsv => "Description",
            Self::TogglApi => "description",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManicTime => "ManicTime",
            Self::TogglCsv => "Toggl CSV",
            Self::TogglApi => "Toggl API",
        };
        write!(f, "{name}")
    }
}

/// A source-agnostic representation of one tracked time interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    source: SourceKind,
    raw: BTreeMap<String, String>,
    description: String,
    issue_id: Option<IssueKey>,
    start_ms: i64,
    duration_minutes: i64,
    ignored: bool,
    record_id: Option<String>,
}

impl TimeEntry {
    /// Builds a normalized entry from a raw source record.
    ///
    /// Derives the issue key, start timestamp, duration, and ignore flag
    /// once. A missing or unparsable start/duration is a load error; a
    /// missing description is not (the tracker rejects it at submission
    /// time instead).
    pub fn from_raw(
        source: SourceKind,
        raw: BTreeMap<String, String>,
    ) -> Result<Self, EntryError> {
        let description = raw
            .get(source.description_field())
            .cloned()
            .unwrap_or_default();
        let issue_id = raw
            .get(source.issue_text_field())
            .and_then(|text| find_issue_key(text));
        let start_ms = derive_start_ms(source, &raw)?;
        let duration_minutes = derive_duration_minutes(source, &raw)?;
        let ignored = raw
            .get(source.ignore_field())
            .is_some_and(|text| text.to_lowercase().contains("ignore"));
        let record_id = match source {
            SourceKind::TogglApi => raw.get("id").cloned(),
            SourceKind::ManicTime | SourceKind::TogglCsv => None,
        };

        Ok(Self {
            source,
            raw,
            description,
            issue_id,
            start_ms,
            duration_minutes,
            ignored,
            record_id,
        })
    }

    /// Returns a copy of this entry with the issue id replaced.
    ///
    /// The raw record and all other derived fields are untouched.
    #[must_use]
    pub fn with_issue_id(&self, issue_id: IssueKey) -> Self {
        Self {
            issue_id: Some(issue_id),
            ..self.clone()
        }
    }

    /// The source this entry was normalized from.
    pub const fn source(&self) -> SourceKind {
        self.source
    }

    /// The raw source record this entry was derived from.
    pub fn raw(&self) -> &BTreeMap<String, String> {
        &self.raw
    }

    /// True when the entry must never be submitted.
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// The issue key associated with this entry, if any.
    pub fn issue_id(&self) -> Option<&IssueKey> {
        self.issue_id.as_ref()
    }

    /// The human-readable description stored on the work item.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Start of the entry as Unix epoch milliseconds (UTC).
    pub const fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Duration of the entry in minutes.
    pub const fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    /// The source-side record identifier (Toggl API only).
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// The submission payload for this entry.
    pub fn work_item(&self) -> WorkItem {
        WorkItem {
            description: self.description.clone(),
            duration_minutes: self.duration_minutes,
            date_ms: self.start_ms,
        }
    }

    /// One-line summary shown to the operator in status lines and prompts.
    pub fn summary(&self) -> String {
        let start = DateTime::from_timestamp_millis(self.start_ms)
            .map(|dt| dt.format("%H:%M %d/%m/%y").to_string())
            .unwrap_or_default();
        match self.source {
            SourceKind::ManicTime => {
                let tags = self.raw.get("Name").map(String::as_str).unwrap_or_default();
                format!("{tags} / {} - {start}", self.description)
            }
            SourceKind::TogglCsv | SourceKind::TogglApi => {
                format!("{} - {start}", self.description)
            }
        }
    }
}

impl fmt::Display for TimeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Converts an `H:MM:SS` clock string to whole minutes.
///
/// The canonical rule: `minutes = H*60 + MM + round(SS/60)`, rounding half
/// away from zero, so 30 or more seconds add one minute. `MM = 59` with
/// `SS >= 30` carries into the next hour through plain integer arithmetic.
pub fn duration_minutes_from_clock(value: &str) -> Result<i64, EntryError> {
    let bad = || EntryError::BadDuration {
        value: value.to_string(),
    };

    let mut parts = value.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };

    let hours: i64 = hours.trim().parse().map_err(|_| bad())?;
    let minutes: i64 = minutes.trim().parse().map_err(|_| bad())?;
    let seconds: f64 = seconds.trim().parse().map_err(|_| bad())?;
    if hours < 0 || minutes < 0 || seconds < 0.0 {
        return Err(bad());
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "seconds/60 rounds to a value far below i64 bounds"
    )]
    let carry = (seconds / 60.0).round() as i64;
    Ok(hours * 60 + minutes + carry)
}

/// Converts a Toggl millisecond duration to whole minutes, rounding to the
/// nearest minute.
pub fn duration_minutes_from_millis(millis: i64) -> Result<i64, EntryError> {
    if millis < 0 {
        return Err(EntryError::BadDuration {
            value: millis.to_string(),
        });
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "realistic durations are far below the f64 integer limit"
    )]
    Ok(((millis as f64) / 60_000.0).round() as i64)
}

fn require<'a>(
    source: SourceKind,
    raw: &'a BTreeMap<String, String>,
    field: &'static str,
) -> Result<&'a str, EntryError> {
    raw.get(field)
        .map(String::as_str)
        .ok_or(EntryError::MissingField { kind: source, field })
}

fn derive_start_ms(source: SourceKind, raw: &BTreeMap<String, String>) -> Result<i64, EntryError> {
    let value = match source {
        SourceKind::ManicTime => require(source, raw, "Start")?.to_string(),
        SourceKind::TogglCsv => format!(
            "{} {}",
            require(source, raw, "Start date")?,
            require(source, raw, "Start time")?
        ),
        // The API reports a UTC offset suffix the format string does not
        // cover; the timestamp is taken as-is without offset conversion.
        SourceKind::TogglApi => require(source, raw, "start")?
            .split('+')
            .next()
            .unwrap_or_default()
            .trim_end_matches('Z')
            .to_string(),
    };

    let format = source.datetime_format();
    let parsed = NaiveDateTime::parse_from_str(&value, format).map_err(|_| {
        EntryError::BadTimestamp {
            value: value.clone(),
            format,
        }
    })?;
    Ok(parsed.and_utc().timestamp_millis())
}

fn derive_duration_minutes(
    source: SourceKind,
    raw: &BTreeMap<String, String>,
) -> Result<i64, EntryError> {
    match source {
        SourceKind::ManicTime | SourceKind::TogglCsv => {
            duration_minutes_from_clock(require(source, raw, "Duration")?)
        }
        SourceKind::TogglApi => {
            let value = require(source, raw, "dur")?;
            let millis: i64 = value.trim().parse().map_err(|_| EntryError::BadDuration {
                value: value.to_string(),
            })?;
            duration_minutes_from_millis(millis)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manictime_raw() -> BTreeMap<String, String> {
        [
            ("Name", "BCSM, BCSM-15"),
            ("Notes", "Support new presences in code"),
            ("Start", "06/10/2014 15:05:00"),
            ("Duration", "3:24:54"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn toggl_csv_raw() -> BTreeMap<String, String> {
        [
            ("Description", "BCSM-15 Support new presences in code"),
            ("Tags", "billable"),
            ("Start date", "2014-10-06"),
            ("Start time", "15:05:00"),
            ("Duration", "3:24:54"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn toggl_api_raw() -> BTreeMap<String, String> {
        [
            ("id", "12345"),
            ("description", "BCSM-15 Support new presences in code"),
            ("start", "2014-10-06T15:05:00+02:00"),
            ("dur", "12294000"),
            ("tags", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn duration_rounds_seconds_to_nearest_minute() {
        assert_eq!(duration_minutes_from_clock("0:14:29").unwrap(), 14);
        assert_eq!(duration_minutes_from_clock("0:14:30").unwrap(), 15);
        assert_eq!(duration_minutes_from_clock("3:24:54").unwrap(), 205);
    }

    #[test]
    fn duration_carries_into_next_hour() {
        assert_eq!(duration_minutes_from_clock("0:59:30").unwrap(), 60);
        assert_eq!(duration_minutes_from_clock("1:59:45").unwrap(), 120);
    }

    #[test]
    fn duration_rejects_garbage() {
        assert!(duration_minutes_from_clock("").is_err());
        assert!(duration_minutes_from_clock("90").is_err());
        assert!(duration_minutes_from_clock("1:2:3:4").is_err());
        assert!(duration_minutes_from_clock("-1:00:00").is_err());
    }

    #[test]
    fn millis_round_to_nearest_minute() {
        assert_eq!(duration_minutes_from_millis(12_294_000).unwrap(), 205);
        assert_eq!(duration_minutes_from_millis(29_999).unwrap(), 0);
        assert_eq!(duration_minutes_from_millis(30_000).unwrap(), 1);
        assert!(duration_minutes_from_millis(-1).is_err());
    }

    #[test]
    fn manictime_entry_derives_work_item_fields() {
        let entry = TimeEntry::from_raw(SourceKind::ManicTime, manictime_raw()).unwrap();
        let item = entry.work_item();
        assert_eq!(item.description, "Support new presences in code");
        assert_eq!(item.duration_minutes, 205);
        assert_eq!(item.date_ms, 1_412_604_300_000);
    }

    #[test]
    fn manictime_entry_finds_issue_in_tags() {
        let entry = TimeEntry::from_raw(SourceKind::ManicTime, manictime_raw()).unwrap();
        assert_eq!(entry.issue_id().unwrap().as_str(), "BCSM-15");
    }

    #[test]
    fn manictime_summary_shows_tags_and_start() {
        let entry = TimeEntry::from_raw(SourceKind::ManicTime, manictime_raw()).unwrap();
        assert_eq!(
            entry.summary(),
            "BCSM, BCSM-15 / Support new presences in code - 15:05 06/10/14"
        );
    }

    #[test]
    fn toggl_csv_entry_combines_date_and_time() {
        let entry = TimeEntry::from_raw(SourceKind::TogglCsv, toggl_csv_raw()).unwrap();
        assert_eq!(entry.start_ms(), 1_412_604_300_000);
        assert_eq!(entry.duration_minutes(), 205);
        assert_eq!(
            entry.summary(),
            "BCSM-15 Support new presences in code - 15:05 06/10/14"
        );
    }

    #[test]
    fn toggl_api_entry_strips_offset_and_converts_millis() {
        let entry = TimeEntry::from_raw(SourceKind::TogglApi, toggl_api_raw()).unwrap();
        assert_eq!(entry.start_ms(), 1_412_604_300_000);
        assert_eq!(entry.duration_minutes(), 205);
        assert_eq!(entry.record_id(), Some("12345"));
    }

    #[test]
    fn ignore_flag_is_case_insensitive() {
        let mut raw = manictime_raw();
        raw.insert("Name".to_string(), "BCSM-15, IGNORE".to_string());
        let entry = TimeEntry::from_raw(SourceKind::ManicTime, raw).unwrap();
        assert!(entry.is_ignored());

        let entry = TimeEntry::from_raw(SourceKind::ManicTime, manictime_raw()).unwrap();
        assert!(!entry.is_ignored());
    }

    #[test]
    fn ignore_checks_tags_not_description() {
        let mut raw = toggl_csv_raw();
        raw.insert(
            "Description".to_string(),
            "ignore the naysayers BCSM-15".to_string(),
        );
        let entry = TimeEntry::from_raw(SourceKind::TogglCsv, raw).unwrap();
        assert!(!entry.is_ignored());
    }

    #[test]
    fn missing_description_becomes_empty_not_error() {
        let mut raw = manictime_raw();
        raw.remove("Notes");
        let entry = TimeEntry::from_raw(SourceKind::ManicTime, raw).unwrap();
        assert_eq!(entry.description(), "");
    }

    #[test]
    fn missing_start_is_a_load_error() {
        let mut raw = manictime_raw();
        raw.remove("Start");
        let err = TimeEntry::from_raw(SourceKind::ManicTime, raw).unwrap_err();
        assert_eq!(
            err,
            EntryError::MissingField {
                kind: SourceKind::ManicTime,
                field: "Start",
            }
        );
    }

    #[test]
    fn with_issue_id_overrides_without_touching_raw() {
        let entry = TimeEntry::from_raw(SourceKind::ManicTime, manictime_raw()).unwrap();
        let corrected = entry.with_issue_id(IssueKey::new("OTHER-1").unwrap());
        assert_eq!(corrected.issue_id().unwrap().as_str(), "OTHER-1");
        assert_eq!(corrected.raw(), entry.raw());
        assert_eq!(entry.issue_id().unwrap().as_str(), "BCSM-15");
    }
}
