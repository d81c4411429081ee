use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::model::config::TogglConfig;
use crate::remote::RemoteError;

const BASE_URL: &str = "https://api.track.toggl.com/api/v9";

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<u64>,
    pub start: DateTime<Utc>,
    /// Seconds; negative while the timer is still running
    pub duration: i64,
    pub workspace_id: u64,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.duration < 0
    }
}

pub struct TogglClient {
    client: Client,
    token: String,
    base_url: String,
}

impl TogglClient {
    pub fn from_config(config: &TogglConfig) -> Result<Self, RemoteError> {
        if config.api_token.trim().is_empty() {
            return Err(RemoteError::MissingToken);
        }
        Ok(TogglClient {
            client: Client::new(),
            token: config.api_token.clone(),
            base_url: BASE_URL.to_string(),
        })
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: String,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        tracing::debug!(endpoint, "toggl request");
        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .basic_auth(&self.token, Some("api_token"))
            .query(query)
            .send()?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                endpoint,
                status: resp.status(),
            });
        }
        Ok(resp.json()?)
    }

    /// The account's first workspace; timers and projects live under it.
    pub fn default_workspace(&self) -> Result<Workspace, RemoteError> {
        let workspaces: Vec<Workspace> =
            self.get("me/workspaces", "me/workspaces".to_string(), &[])?;
        workspaces
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Unexpected("account has no workspaces".to_string()))
    }

    pub fn projects(&self, workspace: u64) -> Result<Vec<Project>, RemoteError> {
        self.get(
            "workspaces/projects",
            format!("workspaces/{}/projects", workspace),
            &[],
        )
    }

    /// Time entries starting in `[start, end)`
    pub fn time_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>, RemoteError> {
        self.get(
            "me/time_entries",
            "me/time_entries".to_string(),
            &[
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
            ],
        )
    }

    /// The currently running time entry, if any
    pub fn current_entry(&self) -> Result<Option<TimeEntry>, RemoteError> {
        self.get(
            "me/time_entries/current",
            "me/time_entries/current".to_string(),
            &[],
        )
    }

    pub fn start_entry(
        &self,
        workspace: u64,
        description: &str,
        project: Option<u64>,
        start: DateTime<Utc>,
    ) -> Result<TimeEntry, RemoteError> {
        let body = json!({
            "created_with": "pa",
            "description": description,
            "duration": -1,
            "project_id": project,
            "start": start.to_rfc3339_opts(SecondsFormat::Secs, true),
            "workspace_id": workspace,
        });
        let resp = self
            .client
            .post(format!("{}/workspaces/{}/time_entries", self.base_url, workspace))
            .basic_auth(&self.token, Some("api_token"))
            .json(&body)
            .send()?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                endpoint: "workspaces/time_entries",
                status: resp.status(),
            });
        }
        Ok(resp.json()?)
    }

    pub fn stop_entry(&self, workspace: u64, entry: u64) -> Result<TimeEntry, RemoteError> {
        let resp = self
            .client
            .patch(format!(
                "{}/workspaces/{}/time_entries/{}/stop",
                self.base_url, workspace, entry
            ))
            .basic_auth(&self.token, Some("api_token"))
            .send()?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                endpoint: "time_entries/stop",
                status: resp.status(),
            });
        }
        Ok(resp.json()?)
    }
}
