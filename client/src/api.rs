// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use common::{Task, TaskPayload, User};
use tracing::debug;

/// Thin wrapper over the REST backend.
///
/// The backend is the system of record; this type only moves JSON back
/// and forth. Every call maps to exactly one request, and a non-success
/// status is reported as an error rather than a silently empty body.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`
    /// (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/tasks`: the full task collection.
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        debug!("Fetching task list from {}", self.base_url);
        let tasks = self
            .http
            .get(self.url("/api/tasks"))
            .send()
            .await
            .context("Failed to request task list")?
            .error_for_status()
            .context("Task list request was rejected")?
            .json()
            .await
            .context("Failed to decode task list")?;
        Ok(tasks)
    }

    /// `GET /api/users`: the team member collection.
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        debug!("Fetching user list from {}", self.base_url);
        let users = self
            .http
            .get(self.url("/api/users"))
            .send()
            .await
            .context("Failed to request user list")?
            .error_for_status()
            .context("User list request was rejected")?
            .json()
            .await
            .context("Failed to decode user list")?;
        Ok(users)
    }

    /// `GET /api/tasks/{id}`: a single task, including its change log.
    pub async fn fetch_task(&self, task_id: i64) -> Result<Task> {
        debug!("Fetching task {}", task_id);
        let task = self
            .http
            .get(self.url(&format!("/api/tasks/{}", task_id)))
            .send()
            .await
            .with_context(|| format!("Failed to request task {}", task_id))?
            .error_for_status()
            .with_context(|| format!("Request for task {} was rejected", task_id))?
            .json()
            .await
            .with_context(|| format!("Failed to decode task {}", task_id))?;
        Ok(task)
    }

    /// `POST /api/tasks`: creates a task; returns the server's copy,
    /// which carries the authoritative id.
    pub async fn create_task(&self, payload: &TaskPayload) -> Result<Task> {
        debug!("Creating task '{}'", payload.title);
        let task = self
            .http
            .post(self.url("/api/tasks"))
            .json(payload)
            .send()
            .await
            .context("Failed to send task creation request")?
            .error_for_status()
            .context("Task creation was rejected")?
            .json()
            .await
            .context("Failed to decode created task")?;
        Ok(task)
    }

    /// `PUT /api/tasks/{id}`: full update; returns the server's copy,
    /// which may normalize fields the client does not own.
    pub async fn update_task(&self, task_id: i64, task: &Task) -> Result<Task> {
        debug!("Updating task {}", task_id);
        let task = self
            .http
            .put(self.url(&format!("/api/tasks/{}", task_id)))
            .json(task)
            .send()
            .await
            .with_context(|| format!("Failed to send update for task {}", task_id))?
            .error_for_status()
            .with_context(|| format!("Update of task {} was rejected", task_id))?
            .json()
            .await
            .with_context(|| format!("Failed to decode updated task {}", task_id))?;
        Ok(task)
    }

    /// `DELETE /api/tasks/{id}`.
    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        debug!("Deleting task {}", task_id);
        self.http
            .delete(self.url(&format!("/api/tasks/{}", task_id)))
            .send()
            .await
            .with_context(|| format!("Failed to send delete for task {}", task_id))?
            .error_for_status()
            .with_context(|| format!("Delete of task {} was rejected", task_id))?;
        Ok(())
    }
}
