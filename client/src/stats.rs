// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::NaiveDate;
use common::{Task, User};

/// Aggregate counters over the full (unfiltered) task list, as shown on
/// the dashboard. Overdue counts every task whose due date has passed,
/// regardless of status.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub overdue: usize,
    pub assigned: usize,
    pub unassigned: usize,
}

impl BoardStats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let count = |pred: &dyn Fn(&Task) -> bool| tasks.iter().filter(|t| pred(t)).count();
        Self {
            total: tasks.len(),
            todo: count(&|t| t.status == "To Do"),
            in_progress: count(&|t| t.status == "In Progress"),
            done: count(&|t| t.status == "Done"),
            high_priority: count(&|t| t.priority == "High"),
            medium_priority: count(&|t| t.priority == "Medium"),
            low_priority: count(&|t| t.priority == "Low"),
            overdue: count(&|t| t.is_overdue(today)),
            assigned: count(&|t| t.assigned_to.is_some()),
            unassigned: count(&|t| t.assigned_to.is_none()),
        }
    }

    /// Share of completed tasks, rounded to whole percent. 0 for an
    /// empty board.
    pub fn completion_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u32
    }

    /// Completion rate with in-progress work counted at half weight.
    pub fn productivity_score(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (((self.done as f64 + self.in_progress as f64 * 0.5) / self.total as f64) * 100.0).round()
            as u32
    }
}

/// Per-member workload summary for the team performance panel and the
/// team report export.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub user: User,
    pub task_count: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub todo: usize,
}

impl UserStats {
    pub fn completion_rate(&self) -> u32 {
        if self.task_count == 0 {
            return 0;
        }
        ((self.completed as f64 / self.task_count as f64) * 100.0).round() as u32
    }
}

/// One summary per user, in the order the user list came from the
/// backend. Assignment matches on the assignee snapshot's id.
pub fn user_stats(users: &[User], tasks: &[Task]) -> Vec<UserStats> {
    users
        .iter()
        .map(|user| {
            let assigned: Vec<&Task> = tasks
                .iter()
                .filter(|t| t.assigned_to.as_ref().map(|u| u.id) == Some(user.id))
                .collect();
            UserStats {
                user: user.clone(),
                task_count: assigned.len(),
                completed: assigned.iter().filter(|t| t.status == "Done").count(),
                in_progress: assigned
                    .iter()
                    .filter(|t| t.status == "In Progress")
                    .count(),
                todo: assigned.iter().filter(|t| t.status == "To Do").count(),
            }
        })
        .collect()
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

    fn task(id: i64, status: &str, priority: &str, due: Option<&str>, user: Option<User>) -> Task {
        Task {
            id,
            title: format!("task {}", id),
            description: String::new(),
            due_date: due.map(str::to_string),
            status: status.to_string(),
            priority: priority.to_string(),
            assigned_to: user,
            change_log: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    #[test]
    fn test_board_stats_counts() {
        let alice = user(1, "alice");
        let tasks = vec![
            task(1, "To Do", "High", Some("2025-07-01"), Some(alice.clone())),
            task(2, "In Progress", "Medium", Some("2025-07-20"), None),
            task(3, "Done", "Low", Some("2025-07-01"), None),
            task(4, "Done", "High", None, Some(alice)),
        ];

        let stats = BoardStats::compute(&tasks, today());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.todo, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.high_priority, 2);
        assert_eq!(stats.medium_priority, 1);
        assert_eq!(stats.low_priority, 1);
        // Overdue is status-blind on the dashboard: tasks 1 and 3.
        assert_eq!(stats.overdue, 2);
        assert_eq!(stats.assigned, 2);
        assert_eq!(stats.unassigned, 2);
    }

    #[test]
    fn test_rates_on_empty_board_are_zero() {
        let stats = BoardStats::compute(&[], today());
        assert_eq!(stats.completion_rate(), 0);
        assert_eq!(stats.productivity_score(), 0);
    }

    #[test]
    fn test_completion_and_productivity_rounding() {
        let tasks = vec![
            task(1, "Done", "Low", None, None),
            task(2, "In Progress", "Low", None, None),
            task(3, "To Do", "Low", None, None),
        ];
        let stats = BoardStats::compute(&tasks, today());

        // 1/3 -> 33%, (1 + 0.5)/3 -> 50%.
        assert_eq!(stats.completion_rate(), 33);
        assert_eq!(stats.productivity_score(), 50);
    }

    #[test]
    fn test_user_stats_aggregation() {
        let alice = user(1, "alice");
        let bob = user(2, "bob");
        let tasks = vec![
            task(1, "Done", "Low", None, Some(alice.clone())),
            task(2, "In Progress", "Low", None, Some(alice.clone())),
            task(3, "To Do", "Low", None, Some(alice.clone())),
            task(4, "Done", "Low", None, None),
        ];

        let stats = user_stats(&[alice, bob], &tasks);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].task_count, 3);
        assert_eq!(stats[0].completed, 1);
        assert_eq!(stats[0].in_progress, 1);
        assert_eq!(stats[0].todo, 1);
        assert_eq!(stats[0].completion_rate(), 33);

        // Bob has nothing assigned; his rate must not divide by zero.
        assert_eq!(stats[1].task_count, 0);
        assert_eq!(stats[1].completion_rate(), 0);
    }
}
