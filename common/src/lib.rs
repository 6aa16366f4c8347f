// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three kanban columns, in board order.
///
/// The backend stores task statuses as plain display strings, so `Task`
/// keeps a `String` field; this enum gives the client a typed handle on
/// the fixed set of columns (ordering, display names, parsing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Board columns in their fixed display order.
    pub const COLUMNS: [TaskStatus; 3] =
        [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    /// The display name used on the wire and in the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Parses a status from the formats the backend has been seen to emit:
    /// display names ("To Do"), enum-style names ("TO_DO", "IN_PROGRESS")
    /// and their compact variants, all case-insensitively.
    pub fn parse(value: &str) -> Option<TaskStatus> {
        match value.to_uppercase().replace(' ', "_").as_str() {
            "TODO" | "TO_DO" => Some(TaskStatus::ToDo),
            "IN_PROGRESS" | "INPROGRESS" => Some(TaskStatus::InProgress),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priorities. Like statuses, these travel as display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] =
        [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<TaskPriority> {
        match value.to_uppercase().as_str() {
            "LOW" => Some(TaskPriority::Low),
            "MEDIUM" => Some(TaskPriority::Medium),
            "HIGH" => Some(TaskPriority::High),
            _ => None,
        }
    }

    /// Sort rank for a raw priority string: High sorts first, anything the
    /// client does not recognize sorts last.
    pub fn sort_rank(value: &str) -> u8 {
        match value {
            "High" => 1,
            "Medium" => 2,
            "Low" => 3,
            _ => 4,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team member, as returned by `GET /api/users`.
///
/// Read-only from the client's perspective; used for assignment display
/// and per-user aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A task, as exchanged with the REST backend.
///
/// Field names follow the backend's camelCase JSON. `assigned_to` is a
/// value snapshot taken at fetch time, not a live link to the user list.
/// `change_log` is a JSON-encoded history string owned entirely by the
/// server; the client never writes it, only parses it for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(default)]
    pub assigned_to: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_log: Option<String>,
}

impl Task {
    /// The due date as a calendar day, if present and well-formed.
    pub fn due_date_parsed(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// True when the due date falls strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date_parsed().map(|d| d < today).unwrap_or(false)
    }
}

/// Assignment reference sent by the task form: `{"id": 3}` or null.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssignedRef {
    pub id: i64,
}

/// Structure used to send task creation/edit data to the API.
/// It's a good practice to separate the fetched model (`Task`)
/// from the form payload, as they have different fields: the payload
/// carries no id (the server assigns one) and only an assignee reference.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(default)]
    pub assigned_to: Option<AssignedRef>,
}

/// One entry of a task's server-side change history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub action: String,
    pub timestamp: String,
}

/// Decodes the `changeLog` string of a task into history entries.
/// Absent, empty or malformed input yields an empty history; a broken
/// log must never take the history view down with it.
pub fn parse_change_log(raw: Option<&str>) -> Vec<ChangeLogEntry> {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return Vec::new(),
    };
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task_json() -> &'static str {
        r#"{
            "id": 7,
            "title": "Write report",
            "description": "Quarterly numbers",
            "dueDate": "2025-06-30",
            "status": "In Progress",
            "priority": "High",
            "assignedTo": {"id": 2, "username": "alice", "email": "alice@example.com", "avatarUrl": null},
            "changeLog": "[{\"action\":\"created\",\"timestamp\":\"2025-06-01T10:00:00\"}]"
        }"#
    }

    #[test]
    fn test_task_wire_field_names() {
        // Arrange & Act: decode a task exactly as the backend sends it
        let task: Task = serde_json::from_str(sample_task_json()).unwrap();

        // Assert
        assert_eq!(task.id, 7);
        assert_eq!(task.due_date.as_deref(), Some("2025-06-30"));
        assert_eq!(task.status, "In Progress");
        assert_eq!(task.assigned_to.as_ref().unwrap().username, "alice");

        // Act: encode it back and check the camelCase names survive
        let encoded = serde_json::to_value(&task).unwrap();
        assert!(encoded.get("dueDate").is_some());
        assert!(encoded.get("assignedTo").is_some());
        assert!(encoded.get("changeLog").is_some());
    }

    #[test]
    fn test_task_minimal_fields() {
        // The backend may omit optional fields entirely.
        let task: Task = serde_json::from_str(
            r#"{"id": 1, "title": "Bare", "status": "To Do", "priority": "Low"}"#,
        )
        .unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.due_date, None);
        assert!(task.assigned_to.is_none());
        assert!(task.change_log.is_none());
    }

    #[test]
    fn test_status_parse_accepts_known_formats() {
        assert_eq!(TaskStatus::parse("To Do"), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::parse("TODO"), Some(TaskStatus::ToDo));
        assert_eq!(
            TaskStatus::parse("in_progress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(
            TaskStatus::parse("InProgress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("Archived"), None);
    }

    #[test]
    fn test_priority_sort_rank() {
        assert_eq!(TaskPriority::sort_rank("High"), 1);
        assert_eq!(TaskPriority::sort_rank("Medium"), 2);
        assert_eq!(TaskPriority::sort_rank("Low"), 3);
        // Unknown values rank after every recognized priority.
        assert_eq!(TaskPriority::sort_rank("Urgent"), 4);
        assert_eq!(TaskPriority::sort_rank(""), 4);
    }

    #[test]
    fn test_due_date_parsing_and_overdue() {
        let mut task: Task = serde_json::from_str(sample_task_json()).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert!(task.is_overdue(today));

        // Due today is not overdue.
        task.due_date = Some("2025-07-01".to_string());
        assert!(!task.is_overdue(today));

        // Absent or malformed dates are never overdue.
        task.due_date = None;
        assert!(!task.is_overdue(today));
        task.due_date = Some("next tuesday".to_string());
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_parse_change_log() {
        let log = parse_change_log(Some(
            r#"[{"action":"created","timestamp":"2025-06-01T10:00:00"},
                {"action":"status changed to Done","timestamp":"2025-06-02T09:30:00"}]"#,
        ));
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, "created");
        assert_eq!(log[1].timestamp, "2025-06-02T09:30:00");
    }

    #[test]
    fn test_parse_change_log_is_fail_soft() {
        assert!(parse_change_log(None).is_empty());
        assert!(parse_change_log(Some("")).is_empty());
        assert!(parse_change_log(Some("not json at all")).is_empty());
    }

    #[test]
    fn test_payload_serializes_assignee_reference() {
        let payload = TaskPayload {
            title: "New task".to_string(),
            description: String::new(),
            due_date: None,
            status: TaskStatus::ToDo.as_str().to_string(),
            priority: TaskPriority::Medium.as_str().to_string(),
            assigned_to: Some(AssignedRef { id: 4 }),
        };
        let encoded = serde_json::to_value(&payload).unwrap();
        assert_eq!(encoded["assignedTo"]["id"], 4);
        // An omitted due date must not appear on the wire at all.
        assert!(encoded.get("dueDate").is_none());
    }
}
