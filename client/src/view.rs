// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{Task, TaskPriority, TaskStatus};

/// Sort rules the board offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DueDate,
    Priority,
}

/// The active filter and sort criteria.
///
/// Both filters are independently optional; an unset filter matches every
/// task. An unset sort key leaves the existing relative order untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardQuery {
    pub filter_status: Option<TaskStatus>,
    pub filter_priority: Option<TaskPriority>,
    pub sort_by: Option<SortKey>,
}

impl BoardQuery {
    /// Resets all criteria, mirroring the board's "clear filters" action.
    pub fn clear(&mut self) {
        *self = BoardQuery::default();
    }
}

/// The presentation-ready grouping: one ordered task list per column.
///
/// This is a pure projection of (tasks, query) and is recomputed on every
/// change to either; it holds clones, never references into the store.
#[derive(Debug, Default)]
pub struct BoardView {
    columns: Vec<(TaskStatus, Vec<Task>)>,
}

impl BoardView {
    /// Tasks of one column, in display order.
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        self.columns
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, tasks)| tasks.as_slice())
            .unwrap_or(&[])
    }

    /// Number of tasks across all columns.
    pub fn len(&self) -> usize {
        self.columns.iter().map(|(_, tasks)| tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the derived view: filter, then sort, then group by status.
///
/// The three steps are deliberately sequential so the intra-column order
/// is exactly the sorted order of the filtered list. Tasks whose status
/// string matches none of the three fixed columns do not appear.
pub fn build_view(tasks: &[Task], query: &BoardQuery) -> BoardView {
    // 1. Filter: logical AND of the optional constraints.
    let filtered: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            query
                .filter_status
                .map(|s| t.status == s.as_str())
                .unwrap_or(true)
                && query
                    .filter_priority
                    .map(|p| t.priority == p.as_str())
                    .unwrap_or(true)
        })
        .collect();

    // 2. Sort. `sort_by` on a Vec is stable, so equal keys keep their
    // relative order and an unset key performs no reordering at all.
    let mut sorted = filtered;
    match query.sort_by {
        Some(SortKey::DueDate) => {
            // Absent dates compare as the empty string and therefore first.
            sorted.sort_by(|a, b| {
                a.due_date
                    .as_deref()
                    .unwrap_or("")
                    .cmp(b.due_date.as_deref().unwrap_or(""))
            });
        }
        Some(SortKey::Priority) => {
            sorted.sort_by_key(|t| TaskPriority::sort_rank(&t.priority));
        }
        None => {}
    }

    // 3. Group into the fixed columns, preserving the sorted order.
    let columns = TaskStatus::COLUMNS
        .iter()
        .map(|status| {
            let bucket: Vec<Task> = sorted
                .iter()
                .filter(|t| t.status == status.as_str())
                .map(|t| (*t).clone())
                .collect();
            (*status, bucket)
        })
        .collect();

    BoardView { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, status: &str, priority: &str, due: Option<&str>) -> Task {
        Task {
            id,
            title: format!("task {}", id),
            description: String::new(),
            due_date: due.map(str::to_string),
            status: status.to_string(),
            priority: priority.to_string(),
            assigned_to: None,
            change_log: None,
        }
    }

    fn ids(view: &BoardView, status: TaskStatus) -> Vec<i64> {
        view.column(status).iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_every_task_lands_in_exactly_one_matching_bucket() {
        let tasks = vec![
            task(1, "To Do", "High", None),
            task(2, "Done", "Low", None),
            task(3, "In Progress", "Medium", None),
            task(4, "To Do", "Low", None),
        ];

        let view = build_view(&tasks, &BoardQuery::default());

        // Union of the buckets is the input set, each task exactly once,
        // and membership matches the task's own status.
        assert_eq!(view.len(), tasks.len());
        for status in TaskStatus::COLUMNS {
            for t in view.column(status) {
                assert_eq!(t.status, status.as_str());
            }
        }
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![1, 4]);
        assert_eq!(ids(&view, TaskStatus::InProgress), vec![3]);
        assert_eq!(ids(&view, TaskStatus::Done), vec![2]);
    }

    #[test]
    fn test_grouped_example_from_two_tasks_sorted_by_priority() {
        // Two tasks, no filters, priority sort: task 1 in "To Do",
        // task 2 in "Done", "In Progress" empty.
        let tasks = vec![
            task(1, "To Do", "High", None),
            task(2, "Done", "Low", None),
        ];
        let query = BoardQuery {
            sort_by: Some(SortKey::Priority),
            ..Default::default()
        };

        let view = build_view(&tasks, &query);

        assert_eq!(ids(&view, TaskStatus::ToDo), vec![1]);
        assert!(view.column(TaskStatus::InProgress).is_empty());
        assert_eq!(ids(&view, TaskStatus::Done), vec![2]);
    }

    #[test]
    fn test_filters_are_an_and_of_optional_constraints() {
        let tasks = vec![
            task(1, "To Do", "High", None),
            task(2, "To Do", "Low", None),
            task(3, "Done", "High", None),
        ];

        // Status filter alone.
        let view = build_view(
            &tasks,
            &BoardQuery {
                filter_status: Some(TaskStatus::ToDo),
                ..Default::default()
            },
        );
        assert_eq!(view.len(), 2);
        assert!(view.column(TaskStatus::Done).is_empty());

        // Priority filter alone.
        let view = build_view(
            &tasks,
            &BoardQuery {
                filter_priority: Some(TaskPriority::High),
                ..Default::default()
            },
        );
        assert_eq!(view.len(), 2);
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![1]);

        // Both together.
        let view = build_view(
            &tasks,
            &BoardQuery {
                filter_status: Some(TaskStatus::ToDo),
                filter_priority: Some(TaskPriority::High),
                ..Default::default()
            },
        );
        assert_eq!(view.len(), 1);
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![1]);
    }

    #[test]
    fn test_priority_sort_orders_high_medium_low() {
        // Deliberately scrambled input, all in one column.
        let tasks = vec![
            task(1, "To Do", "Low", None),
            task(2, "To Do", "High", None),
            task(3, "To Do", "Medium", None),
            task(4, "To Do", "High", None),
        ];
        let query = BoardQuery {
            sort_by: Some(SortKey::Priority),
            ..Default::default()
        };

        let view = build_view(&tasks, &query);

        // High, High, Medium, Low, with the two Highs keeping their
        // original relative order (stability within equal ranks).
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_unrecognized_priority_sorts_last() {
        let tasks = vec![
            task(1, "To Do", "Urgent", None),
            task(2, "To Do", "Low", None),
            task(3, "To Do", "High", None),
        ];
        let query = BoardQuery {
            sort_by: Some(SortKey::Priority),
            ..Default::default()
        };

        let view = build_view(&tasks, &query);
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![3, 2, 1]);
    }

    #[test]
    fn test_due_date_sort_puts_absent_dates_first() {
        let tasks = vec![
            task(1, "To Do", "Low", Some("2025-07-10")),
            task(2, "To Do", "Low", None),
            task(3, "To Do", "Low", Some("2025-06-01")),
            task(4, "To Do", "Low", Some("")),
        ];
        let query = BoardQuery {
            sort_by: Some(SortKey::DueDate),
            ..Default::default()
        };

        let view = build_view(&tasks, &query);

        // Absent and empty dates compare as "" and sort first (stable
        // between themselves), then non-decreasing ISO order.
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_unset_sort_preserves_existing_order() {
        let tasks = vec![
            task(5, "To Do", "Low", Some("2025-12-31")),
            task(1, "To Do", "High", Some("2025-01-01")),
            task(3, "To Do", "Medium", None),
        ];

        let view = build_view(&tasks, &BoardQuery::default());
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![5, 1, 3]);
    }

    #[test]
    fn test_unknown_status_does_not_appear_on_the_board() {
        let tasks = vec![
            task(1, "To Do", "Low", None),
            task(2, "Archived", "Low", None),
        ];

        let view = build_view(&tasks, &BoardQuery::default());
        assert_eq!(view.len(), 1);
        assert_eq!(ids(&view, TaskStatus::ToDo), vec![1]);
    }
}
