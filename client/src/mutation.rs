// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{ChangeLogEntry, Task, TaskPayload, TaskStatus, parse_change_log};
use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::store::TaskStore;

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// A board position: column plus index within the column's display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub column: TaskStatus,
    pub index: usize,
}

/// The result of a completed drag gesture, as reported by the UI.
/// `destination` is `None` when the card was dropped outside any column.
#[derive(Debug, Clone, Copy)]
pub struct DragDrop {
    pub task_id: i64,
    pub source: Slot,
    pub destination: Option<Slot>,
}

/// What a mutation did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The mutation went through; carries the server-confirmed task
    /// (for deletes, the task that was removed).
    Applied(Task),
    /// Nothing to do: missing destination, identical source and
    /// destination, or an unknown task id.
    Noop,
}

// --- Custom Error Handling ---
// Mutations surface their failures as a user-facing message plus a flag
// saying whether an optimistic change had to be rolled back. Internal
// errors are logged here and never shown to the user verbatim.

/// Failure of a board mutation.
#[derive(Debug)]
pub struct MutationError {
    pub message: String,
    pub rolled_back: bool,
}

impl MutationError {
    fn new(message: &str, rolled_back: bool) -> Self {
        Self {
            message: message.to_string(),
            rolled_back,
        }
    }
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// A transient notification raised by a finished mutation.
#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    raised_at: Instant,
}

/// Coordinates board mutations against the backend of record.
///
/// Every mutation follows the same shape: apply the change to the local
/// store first (so the UI reflects it before any network confirmation),
/// then issue the request and reconcile: accept the server's copy
/// verbatim on success, restore the previous snapshot on failure. Task
/// creation is the one exception: no client-assigned id is authoritative,
/// so the insert happens only after the server confirms.
///
/// Mutations on the same task are serialized through a per-id lock; a
/// second gesture on a task whose round trip is still in flight waits for
/// the first to resolve instead of racing it. Mutations on different
/// tasks proceed concurrently. No mutation is retried automatically.
pub struct MutationController {
    api: ApiClient,
    store: Arc<RwLock<TaskStore>>,
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    toast: RwLock<Option<Toast>>,
}

impl MutationController {
    pub fn new(api: ApiClient, store: Arc<RwLock<TaskStore>>) -> Self {
        Self {
            api,
            store,
            locks: Mutex::new(HashMap::new()),
            toast: RwLock::new(None),
        }
    }

    /// The shared store this controller writes to.
    pub fn store(&self) -> &Arc<RwLock<TaskStore>> {
        &self.store
    }

    /// Handles the end of a drag gesture.
    ///
    /// Dropping outside any column, or back onto the exact source slot,
    /// is a no-op: the store is untouched and no request is issued.
    pub async fn drag_task(&self, drop: DragDrop) -> Result<MutationOutcome, MutationError> {
        let Some(destination) = drop.destination else {
            return Ok(MutationOutcome::Noop);
        };
        if destination == drop.source {
            return Ok(MutationOutcome::Noop);
        }

        let _guard = self.lock_task(drop.task_id).await;

        let Some(previous) = self.store.read().task(drop.task_id).cloned() else {
            return Ok(MutationOutcome::Noop);
        };

        // Optimistic apply: the move is visible before the request leaves.
        let mut optimistic = previous.clone();
        optimistic.status = destination.column.as_str().to_string();
        self.store.write().replace(drop.task_id, optimistic.clone());

        match self.api.update_task(drop.task_id, &optimistic).await {
            Ok(confirmed) => {
                // The server copy wins; it may have normalized fields the
                // client does not own, such as the change log.
                self.store.write().replace(drop.task_id, confirmed.clone());
                info!(
                    "Task {} moved to '{}'.",
                    drop.task_id, destination.column
                );
                self.raise_toast(&format!("Task moved to {}!", destination.column));
                Ok(MutationOutcome::Applied(confirmed))
            }
            Err(e) => {
                error!("Status update for task {} failed: {:?}", drop.task_id, e);
                self.store.write().replace(drop.task_id, previous);
                self.raise_toast("Failed to update task status");
                Err(MutationError::new("Failed to update task status", true))
            }
        }
    }

    /// Creates a task from the form payload. The store is only touched
    /// after the server confirms and hands back the authoritative id.
    pub async fn create_task(&self, payload: TaskPayload) -> Result<MutationOutcome, MutationError> {
        match self.api.create_task(&payload).await {
            Ok(created) => {
                info!("Task {} ('{}') created.", created.id, created.title);
                self.store.write().insert(created.clone());
                self.raise_toast("Task created successfully!");
                Ok(MutationOutcome::Applied(created))
            }
            Err(e) => {
                error!("Task creation failed: {:?}", e);
                self.raise_toast("Failed to save task");
                Err(MutationError::new("Failed to save task", false))
            }
        }
    }

    /// Edits a task from the form payload: optimistic replace, then
    /// reconcile against the server's copy or revert.
    pub async fn update_task(
        &self,
        task_id: i64,
        payload: TaskPayload,
    ) -> Result<MutationOutcome, MutationError> {
        let _guard = self.lock_task(task_id).await;

        let Some(previous) = self.store.read().task(task_id).cloned() else {
            return Ok(MutationOutcome::Noop);
        };

        let mut optimistic = previous.clone();
        optimistic.title = payload.title;
        optimistic.description = payload.description;
        optimistic.due_date = payload.due_date;
        optimistic.status = payload.status;
        optimistic.priority = payload.priority;
        // Resolve the assignee reference against the loaded user list so
        // the card can show the assignment before the server answers.
        optimistic.assigned_to = payload.assigned_to.and_then(|r| {
            self.store
                .read()
                .users()
                .iter()
                .find(|u| u.id == r.id)
                .cloned()
        });
        self.store.write().replace(task_id, optimistic.clone());

        match self.api.update_task(task_id, &optimistic).await {
            Ok(confirmed) => {
                info!("Task {} updated.", task_id);
                self.store.write().replace(task_id, confirmed.clone());
                self.raise_toast("Task updated successfully!");
                Ok(MutationOutcome::Applied(confirmed))
            }
            Err(e) => {
                error!("Update of task {} failed: {:?}", task_id, e);
                self.store.write().replace(task_id, previous);
                self.raise_toast("Failed to save task");
                Err(MutationError::new("Failed to save task", true))
            }
        }
    }

    /// Deletes a task: optimistic remove, with the removed task restored
    /// at its original position when the backend refuses.
    pub async fn delete_task(&self, task_id: i64) -> Result<MutationOutcome, MutationError> {
        let _guard = self.lock_task(task_id).await;

        let removed = {
            let mut store = self.store.write();
            store
                .position(task_id)
                .and_then(|idx| store.remove(task_id).map(|task| (idx, task)))
        };
        let Some((index, previous)) = removed else {
            return Ok(MutationOutcome::Noop);
        };

        match self.api.delete_task(task_id).await {
            Ok(()) => {
                info!("Task {} deleted.", task_id);
                self.raise_toast("Task deleted successfully!");
                Ok(MutationOutcome::Applied(previous))
            }
            Err(e) => {
                error!("Delete of task {} failed: {:?}", task_id, e);
                self.store.write().insert_at(index, previous);
                self.raise_toast("Failed to delete task");
                Err(MutationError::new("Failed to delete task", true))
            }
        }
    }

    /// Loads a task's change history. Any failure along the way (request,
    /// decode, or a broken log string) yields an empty history.
    pub async fn load_history(&self, task_id: i64) -> Vec<ChangeLogEntry> {
        match self.api.fetch_task(task_id).await {
            Ok(task) => parse_change_log(task.change_log.as_deref()),
            Err(e) => {
                warn!("History fetch for task {} failed: {:?}", task_id, e);
                Vec::new()
            }
        }
    }

    /// The toast to display right now, if one is still fresh.
    pub fn current_toast(&self) -> Option<String> {
        let guard = self.toast.read();
        match guard.as_ref() {
            Some(t) if t.raised_at.elapsed() < TOAST_DURATION => Some(t.message.clone()),
            _ => None,
        }
    }

    /// Raises a transient toast. Mutations call this internally; the UI
    /// may also surface its own events (e.g. export results) through it.
    pub fn raise_toast(&self, message: &str) {
        *self.toast.write() = Some(Toast {
            message: message.to_string(),
            raised_at: Instant::now(),
        });
    }

    /// Per-task serialization: returns a guard that is held for the whole
    /// round trip of one mutation on `task_id`.
    async fn lock_task(&self, task_id: i64) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(task_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
