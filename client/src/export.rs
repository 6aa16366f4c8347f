// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use common::{Task, User};
use tracing::info;

use crate::stats::{BoardStats, user_stats};

/// Wraps a free-text field in double quotes, doubling any embedded
/// quotes. Numeric and enum-like fields are emitted bare.
fn csv_escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// The flat task list export. One row per task; the export date stands
/// in as the created date, and unassigned tasks print `Unassigned`.
pub fn tasks_csv(tasks: &[Task], today: NaiveDate) -> String {
    let header = "ID,Title,Description,Status,Priority,Due Date,Assigned To,Created Date";
    let mut lines = vec![header.to_string()];
    for task in tasks {
        let assigned = task
            .assigned_to
            .as_ref()
            .map(|u| csv_escape(&u.username))
            .unwrap_or_else(|| "Unassigned".to_string());
        lines.push(format!(
            "{},{},{},{},{},{},{},{}",
            task.id,
            csv_escape(&task.title),
            csv_escape(&task.description),
            task.status,
            task.priority,
            task.due_date.as_deref().unwrap_or(""),
            assigned,
            today,
        ));
    }
    lines.join("\n")
}

/// The per-user workload report.
pub fn team_report_csv(users: &[User], tasks: &[Task]) -> String {
    let header =
        "ID,Username,Email,Total Tasks,Completed Tasks,In Progress Tasks,To Do Tasks,Completion Rate (%)";
    let mut lines = vec![header.to_string()];
    for entry in user_stats(users, tasks) {
        lines.push(format!(
            "{},{},{},{},{},{},{},{}",
            entry.user.id,
            csv_escape(&entry.user.username),
            csv_escape(&entry.user.email),
            entry.task_count,
            entry.completed,
            entry.in_progress,
            entry.todo,
            entry.completion_rate(),
        ));
    }
    lines.join("\n")
}

/// The sectioned project summary: label/value pairs with blank separator
/// rows, exactly as the dashboard's summary export lays them out.
pub fn project_summary_csv(tasks: &[Task], users: &[User], today: NaiveDate) -> String {
    let stats = BoardStats::compute(tasks, today);
    let rows: Vec<(String, String)> = vec![
        ("Project Summary Report".to_string(), String::new()),
        ("Generated on".to_string(), today.to_string()),
        (String::new(), String::new()),
        ("Task Statistics".to_string(), String::new()),
        ("Total Tasks".to_string(), stats.total.to_string()),
        ("Completed Tasks".to_string(), stats.done.to_string()),
        ("In Progress Tasks".to_string(), stats.in_progress.to_string()),
        ("To Do Tasks".to_string(), stats.todo.to_string()),
        (
            "Completion Rate (%)".to_string(),
            stats.completion_rate().to_string(),
        ),
        (String::new(), String::new()),
        ("Priority Distribution".to_string(), String::new()),
        ("High Priority".to_string(), stats.high_priority.to_string()),
        (
            "Medium Priority".to_string(),
            stats.medium_priority.to_string(),
        ),
        ("Low Priority".to_string(), stats.low_priority.to_string()),
        (String::new(), String::new()),
        ("Assignment Status".to_string(), String::new()),
        ("Assigned Tasks".to_string(), stats.assigned.to_string()),
        ("Unassigned Tasks".to_string(), stats.unassigned.to_string()),
        ("Overdue Tasks".to_string(), stats.overdue.to_string()),
        (String::new(), String::new()),
        ("Team Information".to_string(), String::new()),
        ("Total Team Members".to_string(), users.len().to_string()),
    ];
    rows.iter()
        .map(|(label, value)| format!("{},{}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes an export to `<dir>/<prefix>_<date>.csv` and returns the path.
/// This is the terminal counterpart of the browser's file download.
pub fn write_export(dir: &Path, prefix: &str, content: &str, today: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(format!("{}_{}.csv", prefix, today));
    fs::write(&path, content)
        .with_context(|| format!("Failed to write export file {}", path.display()))?;
    info!("Wrote export {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
            email: format!("{}@example.com", name),
            avatar_url: None,
        }
    }

    fn task(id: i64, title: &str, status: &str, user: Option<User>) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: "plain".to_string(),
            due_date: Some("2025-07-20".to_string()),
            status: status.to_string(),
            priority: "High".to_string(),
            assigned_to: user,
            change_log: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    #[test]
    fn test_empty_task_export_is_header_only() {
        let csv = tasks_csv(&[], today());
        assert_eq!(
            csv,
            "ID,Title,Description,Status,Priority,Due Date,Assigned To,Created Date"
        );
    }

    #[test]
    fn test_task_rows_quote_free_text_and_mark_unassigned() {
        let csv = tasks_csv(
            &[
                task(1, "Plain title", "To Do", Some(user(1, "alice"))),
                task(2, "Has \"quotes\" inside", "Done", None),
            ],
            today(),
        );

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1,\"Plain title\",\"plain\",To Do,High,2025-07-20,\"alice\",2025-07-15"
        );
        // Embedded quotes are doubled inside the quoted field.
        assert_eq!(
            lines[2],
            "2,\"Has \"\"quotes\"\" inside\",\"plain\",Done,High,2025-07-20,Unassigned,2025-07-15"
        );
    }

    #[test]
    fn test_team_report_rows() {
        let alice = user(1, "alice");
        let tasks = vec![
            task(1, "a", "Done", Some(alice.clone())),
            task(2, "b", "In Progress", Some(alice.clone())),
        ];

        let csv = team_report_csv(&[alice, user(2, "bob")], &tasks);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1,\"alice\",\"alice@example.com\",2,1,1,0,50");
        assert_eq!(lines[2], "2,\"bob\",\"bob@example.com\",0,0,0,0,0");
    }

    #[test]
    fn test_empty_team_report_is_header_only() {
        let csv = team_report_csv(&[], &[]);
        assert_eq!(
            csv,
            "ID,Username,Email,Total Tasks,Completed Tasks,In Progress Tasks,To Do Tasks,Completion Rate (%)"
        );
    }

    #[test]
    fn test_project_summary_sections() {
        let csv = project_summary_csv(
            &[task(1, "a", "Done", None)],
            &[user(1, "alice")],
            today(),
        );
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Project Summary Report,");
        assert_eq!(lines[1], "Generated on,2025-07-15");
        assert!(lines.contains(&"Total Tasks,1"));
        assert!(lines.contains(&"Completion Rate (%),100"));
        assert!(lines.contains(&"Total Team Members,1"));
    }

    #[test]
    fn test_write_export_names_file_by_prefix_and_date() {
        let dir = tempfile::tempdir().unwrap();
        let csv = tasks_csv(&[], today());

        let path = write_export(dir.path(), "tasks_export", &csv, today()).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "tasks_export_2025-07-15.csv"
        );
        assert_eq!(fs::read_to_string(path).unwrap(), csv);
    }
}
