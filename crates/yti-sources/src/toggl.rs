//! Toggl adapters: detailed CSV exports and the Reports API.
//!
//! CSV exports carry `Description`, `Tags`, `Start date`/`Start time`, and
//! an `H:MM:SS` `Duration`. The Reports API details endpoint returns the
//! same entries as JSON with millisecond durations and record ids; created
//! entries can later be bulk-tagged through the regular Toggl API so
//! reruns are recognizable on the Toggl side too.

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use yti_core::{SourceKind, TimeEntry};

use crate::date_range::DateRange;
use crate::{SourceError, entries_from_csv};

const DETAILS_URL: &str = "https://api.track.toggl.com/reports/api/v2/details";
const TIME_ENTRIES_URL: &str = "https://api.track.toggl.com/api/v9/workspaces";
const USER_AGENT: &str = "yti";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads every row of a Toggl detailed CSV export, in file order.
pub fn load_csv<R: Read>(reader: R) -> Result<Vec<TimeEntry>, SourceError> {
    entries_from_csv(SourceKind::TogglCsv, reader)
}

/// Blocking client for the Toggl Reports API.
pub struct ReportsClient {
    http: reqwest::blocking::Client,
    token: String,
    workspace_id: String,
}

impl std::fmt::Debug for ReportsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportsClient")
            .field("workspace_id", &self.workspace_id)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ReportsClient {
    /// Creates a client for the given API token and workspace.
    pub fn new(
        token: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            workspace_id: workspace_id.into(),
        })
    }

    /// Fetches all detailed entries in the range, following report paging.
    pub fn fetch(&self, range: DateRange) -> Result<Vec<TimeEntry>, SourceError> {
        let since = range.since.format("%Y-%m-%d").to_string();
        let until = range.until.format("%Y-%m-%d").to_string();

        let mut entries = Vec::new();
        let mut page: u64 = 1;
        loop {
            let payload: DetailsPage = self
                .http
                .get(DETAILS_URL)
                .basic_auth(&self.token, Some("api_token"))
                .query(&[
                    ("workspace_id", self.workspace_id.as_str()),
                    ("since", since.as_str()),
                    ("until", until.as_str()),
                    ("user_agent", USER_AGENT),
                    ("page", &page.to_string()),
                ])
                .send()?
                .error_for_status()?
                .json()?;

            if payload.data.is_empty() {
                break;
            }
            for record in payload.data {
                let index = entries.len() + 1;
                let entry = TimeEntry::from_raw(SourceKind::TogglApi, record.into_raw())
                    .map_err(|source| SourceError::Entry { index, source })?;
                entries.push(entry);
            }
            if entries.len() as u64 >= payload.total_count {
                break;
            }
            page += 1;
        }

        tracing::debug!(count = entries.len(), %since, %until, "fetched toggl entries");
        Ok(entries)
    }

    /// Adds a tag to the given time entries in one bulk call.
    ///
    /// Used after an import run to mark the entries that were turned into
    /// tracker work items.
    pub fn tag_entries(&self, record_ids: &[String], tag: &str) -> Result<(), SourceError> {
        if record_ids.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{TIME_ENTRIES_URL}/{}/time_entries/{}",
            self.workspace_id,
            record_ids.join(",")
        );
        self.http
            .patch(&url)
            .basic_auth(&self.token, Some("api_token"))
            .json(&json!([{ "op": "add", "path": "/tags", "value": [tag] }]))
            .send()?
            .error_for_status()?;
        tracing::debug!(count = record_ids.len(), tag, "tagged toggl entries");
        Ok(())
    }
}

/// One page of the details report.
#[derive(Debug, Deserialize)]
struct DetailsPage {
    total_count: u64,
    data: Vec<DetailsRecord>,
}

/// One detailed time entry as returned by the Reports API.
#[derive(Debug, Deserialize)]
struct DetailsRecord {
    id: Option<i64>,
    description: Option<String>,
    start: Option<String>,
    dur: Option<i64>,
    #[serde(default)]
    tags: Vec<String>,
}

impl DetailsRecord {
    /// Flattens the record into the string field map entries derive from.
    fn into_raw(self) -> BTreeMap<String, String> {
        let mut raw = BTreeMap::new();
        if let Some(id) = self.id {
            raw.insert("id".to_string(), id.to_string());
        }
        if let Some(description) = self.description {
            raw.insert("description".to_string(), description);
        }
        if let Some(start) = self.start {
            raw.insert("start".to_string(), start);
        }
        if let Some(dur) = self.dur {
            raw.insert("dur".to_string(), dur.to_string());
        }
        raw.insert("tags".to_string(), self.tags.join(", "));
        raw
    }
}
