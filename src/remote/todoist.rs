use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::model::config::TodoistConfig;
use crate::remote::RemoteError;

const BASE_URL: &str = "https://api.todoist.com/rest/v2";

/// Server-side filter equivalent to "overdue or due today"
const ACTIVE_FILTER: &str = "overdue | today";

/// A task as reported by the remote service: the id is service-assigned and
/// immutable, and membership in the active set is implied by being returned
/// at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteTask {
    pub id: u64,
    pub content: String,
}

/// The remote task service as the reconciler sees it. The production
/// implementation is [`TodoistClient`]; tests substitute an in-memory fake.
pub trait TaskService {
    /// All tasks that are overdue or due today
    fn fetch_active(&self) -> Result<Vec<RemoteTask>, RemoteError>;
    /// Mark a task complete
    fn close(&self, id: u64) -> Result<(), RemoteError>;
    /// Create a task due on the given date, returning the assigned id
    fn create(&self, content: &str, due: NaiveDate) -> Result<u64, RemoteError>;
}

pub struct TodoistClient {
    client: Client,
    token: String,
    base_url: String,
}

impl TodoistClient {
    pub fn from_config(config: &TodoistConfig) -> Result<Self, RemoteError> {
        if config.api_token.trim().is_empty() {
            return Err(RemoteError::MissingToken);
        }
        Ok(TodoistClient {
            client: Client::new(),
            token: config.api_token.clone(),
            base_url: BASE_URL.to_string(),
        })
    }
}

#[derive(Serialize)]
struct NewTask<'a> {
    content: &'a str,
    due_string: String,
    due_lang: &'a str,
    priority: u8,
}

#[derive(Deserialize)]
struct CreatedTask {
    id: u64,
}

impl TaskService for TodoistClient {
    fn fetch_active(&self) -> Result<Vec<RemoteTask>, RemoteError> {
        tracing::debug!(filter = ACTIVE_FILTER, "fetching active tasks");
        let resp = self
            .client
            .get(format!("{}/tasks", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("filter", ACTIVE_FILTER)])
            .send()?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                endpoint: "tasks",
                status: resp.status(),
            });
        }
        Ok(resp.json()?)
    }

    fn close(&self, id: u64) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(format!("{}/tasks/{}/close", self.base_url, id))
            .bearer_auth(&self.token)
            .send()?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                endpoint: "tasks/close",
                status: resp.status(),
            });
        }
        Ok(())
    }

    fn create(&self, content: &str, due: NaiveDate) -> Result<u64, RemoteError> {
        let body = NewTask {
            content,
            due_string: format!("{}/{}/{}", due.month(), due.day(), due.year()),
            due_lang: "en",
            priority: 1,
        };
        let resp = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status {
                endpoint: "tasks",
                status: resp.status(),
            });
        }
        let created: CreatedTask = resp.json()?;
        Ok(created.id)
    }
}
