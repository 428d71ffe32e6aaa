//! YouTrack REST gateway for the time importer.
//!
//! Implements [`yti_core::TrackerGateway`] over the YouTrack REST API with
//! permanent-token authentication. The client is blocking: the importer is
//! synchronous end to end and blocks on operator input between calls.
//!
//! Status mapping: HTTP 404 becomes [`TrackerError::IssueNotFound`], 400
//! becomes [`TrackerError::MalformedWorkItem`], and 401/403 plus all
//! transport failures become [`TrackerError::Connection`].

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use yti_core::{ExistingWorkItem, IssueKey, TrackerError, TrackerGateway, WorkItem};

/// Default request timeout for tracker calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const WORK_ITEM_FIELDS: &str = "author(login),date,duration(minutes)";

/// Blocking YouTrack client bound to one authenticated user.
///
/// Construction performs a `users/me` round trip, so an unreachable server
/// or a rejected token fails fast before any entries are processed.
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
    login: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connects to a YouTrack instance and resolves the current user.
    pub fn connect(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, TrackerError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TrackerError::Connection {
                message: "API token is empty".to_string(),
            });
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(connection_error)?;

        let mut client = Self {
            http,
            base_url,
            token,
            login: String::new(),
        };
        let me: MePayload = client
            .get(
                "api/users/me",
                &[("fields", "login")],
                "current user lookup",
            )?
            .json()
            .map_err(connection_error)?;
        client.login = me.login;
        tracing::debug!(login = %client.login, url = %client.base_url, "connected to YouTrack");
        Ok(client)
    }

    /// Issue keys updated by the given user between two dates (inclusive).
    ///
    /// Dates are `YYYY-MM-DD` strings in the tracker's query syntax.
    pub fn issues_updated_between(
        &self,
        since: &str,
        until: &str,
        updater: &str,
    ) -> Result<Vec<String>, TrackerError> {
        let query = format!("updated: {since} .. {until} updater: {updater}");
        let issues: Vec<IssuePayload> = self
            .get(
                "api/issues",
                &[
                    ("query", query.as_str()),
                    ("fields", "idReadable"),
                    ("$top", "-1"),
                ],
                "issue search",
            )?
            .json()
            .map_err(connection_error)?;
        Ok(issues.into_iter().map(|issue| issue.id_readable).collect())
    }

    fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<reqwest::blocking::Response, TrackerError> {
        let response = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .map_err(connection_error)?;
        check_status(response, context)
    }
}

impl TrackerGateway for Client {
    fn current_user_login(&self) -> &str {
        &self.login
    }

    fn get_work_items(&self, issue: &IssueKey) -> Result<Vec<ExistingWorkItem>, TrackerError> {
        let path = format!("api/issues/{issue}/timeTracking/workItems");
        let response = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("fields", WORK_ITEM_FIELDS), ("$top", "-1")])
            .send()
            .map_err(connection_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrackerError::IssueNotFound {
                issue: issue.to_string(),
            });
        }
        let payloads: Vec<WorkItemPayload> = check_status(response, "work item list")?
            .json()
            .map_err(connection_error)?;
        Ok(payloads
            .into_iter()
            .filter_map(WorkItemPayload::into_existing)
            .collect())
    }

    fn create_work_item(&self, issue: &IssueKey, item: &WorkItem) -> Result<(), TrackerError> {
        if item.description.trim().is_empty() {
            return Err(TrackerError::MalformedWorkItem {
                message: "missing description".to_string(),
            });
        }

        let body = CreateWorkItemBody {
            date: item.date_ms,
            duration: DurationBody {
                minutes: item.duration_minutes,
            },
            text: &item.description,
        };
        let response = self
            .http
            .post(format!(
                "{}/api/issues/{issue}/timeTracking/workItems",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(connection_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(TrackerError::IssueNotFound {
                issue: issue.to_string(),
            }),
            StatusCode::BAD_REQUEST => Err(TrackerError::MalformedWorkItem {
                message: error_message(response),
            }),
            _ => {
                check_status(response, "work item creation")?;
                tracing::debug!(issue = %issue, "created work item");
                Ok(())
            }
        }
    }

    fn issue_exists(&self, issue: &IssueKey) -> Result<bool, TrackerError> {
        let path = format!("api/issues/{issue}");
        let response = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("fields", "idReadable")])
            .send()
            .map_err(connection_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response, "issue lookup")?;
        Ok(true)
    }

    fn project_exists(&self, project: &str) -> Result<bool, TrackerError> {
        let projects: Vec<ProjectPayload> = self
            .get(
                "api/admin/projects",
                &[("fields", "shortName"), ("$top", "-1")],
                "project lookup",
            )?
            .json()
            .map_err(connection_error)?;
        Ok(projects.iter().any(|candidate| {
            candidate
                .short_name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(project))
        }))
    }
}

fn connection_error(err: reqwest::Error) -> TrackerError {
    TrackerError::Connection {
        message: err.to_string(),
    }
}

/// Maps unexpected statuses to the connection class; auth failures are
/// connection-class too since they abort the batch just the same.
fn check_status(
    response: reqwest::blocking::Response,
    context: &str,
) -> Result<reqwest::blocking::Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(TrackerError::Connection {
        message: format!("{context} failed with status {status}: {}", error_message(response)),
    })
}

/// Pulls the human-readable error out of a YouTrack error body.
fn error_message(response: reqwest::blocking::Response) -> String {
    let body = response.text().unwrap_or_default();
    parse_error_body(&body).unwrap_or(body)
}

fn parse_error_body(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error_description: Option<String>,
        error: Option<String>,
    }

    let payload: ErrorPayload = serde_json::from_str(body).ok()?;
    payload.error_description.or(payload.error)
}

#[derive(Debug, Deserialize)]
struct MePayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    #[serde(rename = "idReadable")]
    id_readable: String,
}

#[derive(Debug, Deserialize)]
struct ProjectPayload {
    #[serde(rename = "shortName")]
    short_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateWorkItemBody<'a> {
    date: i64,
    duration: DurationBody,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct DurationBody {
    minutes: i64,
}

/// A work item as returned by the tracker.
///
/// `date` is tolerated as either a number or a numeric string; older
/// YouTrack versions returned timestamps as text.
#[derive(Debug, Deserialize)]
struct WorkItemPayload {
    author: Option<AuthorPayload>,
    date: Option<Value>,
    duration: Option<DurationPayload>,
}

#[derive(Debug, Deserialize)]
struct AuthorPayload {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DurationPayload {
    minutes: Option<Value>,
}

impl WorkItemPayload {
    /// Normalizes the payload into integer fields for duplicate comparison.
    ///
    /// Items missing any comparison field are dropped; they can never match
    /// a candidate and carry nothing the engine uses.
    fn into_existing(self) -> Option<ExistingWorkItem> {
        let author_login = self.author.and_then(|author| author.login)?;
        let date_ms = value_to_i64(&self.date?)?;
        let duration_minutes = value_to_i64(&self.duration?.minutes?)?;
        Some(ExistingWorkItem {
            author_login,
            date_ms,
            duration_minutes,
        })
    }
}

/// Accepts both numeric and string representations of an integer.
fn value_to_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
}
