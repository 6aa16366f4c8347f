// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{Duration, NaiveDate};
use common::Task;

use crate::stats::BoardStats;

/// Severity of a panel notification, in display-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Warning,
    Info,
    Success,
}

/// One entry of the notification panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Derives the notification panel from the task list.
///
/// Pure function of (tasks, today) so the panel can be recomputed on every
/// store change, like the rest of the derived state. Done tasks never
/// trigger due-date notifications; the achievement entry appears once the
/// completion rate reaches 80% on a non-empty board.
pub fn build_notifications(tasks: &[Task], today: NaiveDate) -> Vec<Notification> {
    let mut notifications = Vec::new();

    let overdue = tasks
        .iter()
        .filter(|t| t.status != "Done" && t.is_overdue(today))
        .count();
    if overdue > 0 {
        notifications.push(Notification {
            kind: NotificationKind::Error,
            title: "Overdue Tasks".to_string(),
            message: format!(
                "You have {} overdue task(s) that need attention.",
                overdue
            ),
        });
    }

    let due_today = tasks
        .iter()
        .filter(|t| t.status != "Done" && t.due_date_parsed() == Some(today))
        .count();
    if due_today > 0 {
        notifications.push(Notification {
            kind: NotificationKind::Warning,
            title: "Tasks Due Today".to_string(),
            message: format!("{} task(s) are due today.", due_today),
        });
    }

    let tomorrow = today + Duration::days(1);
    let due_tomorrow = tasks
        .iter()
        .filter(|t| t.status != "Done" && t.due_date_parsed() == Some(tomorrow))
        .count();
    if due_tomorrow > 0 {
        notifications.push(Notification {
            kind: NotificationKind::Info,
            title: "Tasks Due Tomorrow".to_string(),
            message: format!("{} task(s) are due tomorrow.", due_tomorrow),
        });
    }

    let stats = BoardStats::compute(tasks, today);
    if stats.total > 0 && stats.completion_rate() >= 80 {
        notifications.push(Notification {
            kind: NotificationKind::Success,
            title: "Great Progress!".to_string(),
            message: format!(
                "You've completed {}% of your tasks. Keep it up!",
                stats.completion_rate()
            ),
        });
    }

    notifications
}
