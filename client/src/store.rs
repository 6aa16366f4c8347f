// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{Task, User};
use tracing::{info, warn};

use crate::api::ApiClient;

/// Canonical in-memory state for the session: the task list and the team
/// member list, exactly as last reconciled with the backend.
///
/// The store is the sole writer of `Task` values; views work on clones.
/// Invariant: task ids are unique within the collection at all times.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    users: Vec<User>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Fetches both collections from the backend.
    ///
    /// Fails soft: if either request fails, BOTH collections are reset to
    /// empty. The board must never show stale tasks next to a missing user
    /// list (or vice versa) after a partial failure: either both load, or
    /// both are treated as absent.
    pub async fn load(&mut self, api: &ApiClient) {
        match tokio::try_join!(api.fetch_tasks(), api.fetch_users()) {
            Ok((tasks, users)) => {
                info!(
                    "Loaded {} tasks and {} users from the backend.",
                    tasks.len(),
                    users.len()
                );
                self.tasks = tasks;
                self.users = users;
            }
            Err(e) => {
                warn!("Initial load failed, starting with an empty board: {:?}", e);
                self.tasks = Vec::new();
                self.users = Vec::new();
            }
        }
    }

    /// Looks up a task by id.
    pub fn task(&self, task_id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Position of a task in insertion order.
    pub fn position(&self, task_id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    /// Appends a task. If a task with the same id is already present it is
    /// replaced in place instead, so the id-uniqueness invariant holds no
    /// matter what the caller hands in.
    pub fn insert(&mut self, task: Task) {
        match self.position(task.id) {
            Some(idx) => self.tasks[idx] = task,
            None => self.tasks.push(task),
        }
    }

    /// Re-inserts a task at a specific position (clamped to the current
    /// length). Used to restore a removed task where it used to sit.
    pub fn insert_at(&mut self, index: usize, task: Task) {
        if self.position(task.id).is_some() {
            // Already present; fall back to a plain replace.
            self.insert(task);
            return;
        }
        let index = index.min(self.tasks.len());
        self.tasks.insert(index, task);
    }

    /// Replaces the task with the given id. Returns false when no such
    /// task exists; the collection is left untouched in that case.
    pub fn replace(&mut self, task_id: i64, task: Task) -> bool {
        match self.position(task_id) {
            Some(idx) => {
                self.tasks[idx] = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with the given id, returning it for a potential
    /// restore. Relative order of the remaining tasks is preserved.
    pub fn remove(&mut self, task_id: i64) -> Option<Task> {
        self.position(task_id).map(|idx| self.tasks.remove(idx))
    }
}
