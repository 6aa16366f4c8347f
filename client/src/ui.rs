// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use common::{ChangeLogEntry, TaskPayload, TaskPriority, TaskStatus, AssignedRef};
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use parking_lot::RwLock;
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::api::ApiClient;
use crate::colors::get_or_assign_user_color;
use crate::export;
use crate::mutation::{DragDrop, MutationController, Slot};
use crate::notifications::{Notification, NotificationKind, build_notifications};
use crate::stats::{BoardStats, user_stats};
use crate::store::TaskStore;
use crate::view::{BoardQuery, BoardView, SortKey, build_view};

/// Which main panel is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Board,
    Dashboard,
}

/// Top-level UI state: the shared store and controller plus everything
/// that only matters to presentation (selection, filters, open panels).
pub struct BoardApp {
    api: ApiClient,
    store: Arc<RwLock<TaskStore>>,
    controller: Arc<MutationController>,
    query: BoardQuery,
    view_mode: ViewMode,
    selected_column: usize,
    selected_task: usize,
    show_notifications: bool,
    history: Option<(i64, Vec<ChangeLogEntry>)>,
}

impl BoardApp {
    pub fn new(
        api: ApiClient,
        store: Arc<RwLock<TaskStore>>,
        controller: Arc<MutationController>,
    ) -> Self {
        Self {
            api,
            store,
            controller,
            query: BoardQuery::default(),
            view_mode: ViewMode::Board,
            selected_column: 0,
            selected_task: 0,
            show_notifications: false,
            history: None,
        }
    }

    /// Re-fetches both collections, swapping the result in atomically.
    async fn reload(&self) {
        let mut fresh = TaskStore::new();
        fresh.load(&self.api).await;
        *self.store.write() = fresh;
    }

    /// Builds the drag gesture for moving the selected task one column in
    /// `direction`. A move off either edge of the board has no
    /// destination and the controller treats it as a no-op.
    fn drag_for_selection(&self, view: &BoardView, direction: isize) -> Option<DragDrop> {
        let source_column = TaskStatus::COLUMNS[self.selected_column];
        let task = view.column(source_column).get(self.selected_task)?;
        let dest_index = self.selected_column as isize + direction;
        let destination = if (0..TaskStatus::COLUMNS.len() as isize).contains(&dest_index) {
            let column = TaskStatus::COLUMNS[dest_index as usize];
            Some(Slot {
                column,
                index: view.column(column).len(),
            })
        } else {
            None
        };
        Some(DragDrop {
            task_id: task.id,
            source: Slot {
                column: source_column,
                index: self.selected_task,
            },
            destination,
        })
    }

    fn cycle_status_filter(&mut self) {
        self.query.filter_status = match self.query.filter_status {
            None => Some(TaskStatus::ToDo),
            Some(TaskStatus::ToDo) => Some(TaskStatus::InProgress),
            Some(TaskStatus::InProgress) => Some(TaskStatus::Done),
            Some(TaskStatus::Done) => None,
        };
    }

    fn cycle_priority_filter(&mut self) {
        self.query.filter_priority = match self.query.filter_priority {
            None => Some(TaskPriority::High),
            Some(TaskPriority::High) => Some(TaskPriority::Medium),
            Some(TaskPriority::Medium) => Some(TaskPriority::Low),
            Some(TaskPriority::Low) => None,
        };
    }

    fn cycle_sort(&mut self) {
        self.query.sort_by = match self.query.sort_by {
            None => Some(SortKey::DueDate),
            Some(SortKey::DueDate) => Some(SortKey::Priority),
            Some(SortKey::Priority) => None,
        };
    }

    /// Reads the create/edit form from prompt input.
    fn prompt_payload(&self, defaults: Option<&TaskPayload>) -> Option<TaskPayload> {
        let title = prompt("Task title")?;
        let title = if title.is_empty() {
            defaults.map(|d| d.title.clone())?
        } else {
            title
        };
        let description = prompt("Description (may be empty)")?;
        let due_date = prompt("Due date (YYYY-MM-DD, blank for none)")?;
        let due_date = if due_date.is_empty() {
            None
        } else {
            Some(due_date)
        };
        let priority = prompt("Priority (Low/Medium/High)")?;
        let priority = TaskPriority::parse(&priority)
            .unwrap_or(TaskPriority::Medium)
            .as_str()
            .to_string();
        let assignee = prompt("Assign to username (blank for none)")?;
        let assigned_to = if assignee.is_empty() {
            None
        } else {
            self.store
                .read()
                .users()
                .iter()
                .find(|u| u.username == assignee)
                .map(|u| AssignedRef { id: u.id })
        };
        Some(TaskPayload {
            title,
            description,
            due_date,
            status: defaults
                .map(|d| d.status.clone())
                .unwrap_or_else(|| TaskStatus::ToDo.as_str().to_string()),
            priority,
            assigned_to,
        })
    }
}

/// The main event loop: recompute derived state, draw, react to one key.
pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut BoardApp) -> io::Result<()> {
    loop {
        let today = Local::now().date_naive();

        // Derived state is recomputed from a store snapshot every frame;
        // spawned mutations may have landed since the last one.
        let (view, stats, notifications) = {
            let store = app.store.read();
            (
                build_view(store.tasks(), &app.query),
                BoardStats::compute(store.tasks(), today),
                build_notifications(store.tasks(), today),
            )
        };

        // Keep the selection inside the (possibly shrunk) column.
        let column_len = view.column(TaskStatus::COLUMNS[app.selected_column]).len();
        if app.selected_task >= column_len {
            app.selected_task = column_len.saturating_sub(1);
        }

        let toast = app.controller.current_toast();
        terminal.draw(|f| draw(f, app, &view, &stats, &notifications, toast.as_deref()))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            // An open history panel swallows every key except its own
            // close bindings.
            if app.history.is_some() {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q')) {
                    app.history = None;
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()), // Quit
                KeyCode::Char('v') => {
                    app.view_mode = match app.view_mode {
                        ViewMode::Board => ViewMode::Dashboard,
                        ViewMode::Dashboard => ViewMode::Board,
                    };
                }
                KeyCode::Char('n') => app.show_notifications = !app.show_notifications,
                KeyCode::Char('r') => app.reload().await,
                KeyCode::Left => {
                    if app.selected_column > 0 {
                        app.selected_column -= 1;
                        app.selected_task = 0;
                    }
                }
                KeyCode::Right => {
                    if app.selected_column < TaskStatus::COLUMNS.len() - 1 {
                        app.selected_column += 1;
                        app.selected_task = 0;
                    }
                }
                KeyCode::Up => {
                    if app.selected_task > 0 {
                        app.selected_task -= 1;
                    }
                }
                KeyCode::Down => {
                    if app.selected_task + 1 < column_len {
                        app.selected_task += 1;
                    }
                }
                KeyCode::Enter => {
                    // Move the selected task one column forward.
                    if let Some(drop) = app.drag_for_selection(&view, 1) {
                        let controller = app.controller.clone();
                        tokio::spawn(async move {
                            let _ = controller.drag_task(drop).await;
                        });
                    }
                }
                KeyCode::Char('b') => {
                    // Move the selected task one column back.
                    if let Some(drop) = app.drag_for_selection(&view, -1) {
                        let controller = app.controller.clone();
                        tokio::spawn(async move {
                            let _ = controller.drag_task(drop).await;
                        });
                    }
                }
                KeyCode::Char('a') => {
                    // Add a new task
                    if let Some(payload) = app.prompt_payload(None) {
                        let controller = app.controller.clone();
                        tokio::spawn(async move {
                            let _ = controller.create_task(payload).await;
                        });
                    }
                }
                KeyCode::Char('e') => {
                    // Edit the selected task, keeping unchanged fields.
                    let selected = view
                        .column(TaskStatus::COLUMNS[app.selected_column])
                        .get(app.selected_task)
                        .cloned();
                    if let Some(task) = selected {
                        let defaults = TaskPayload {
                            title: task.title.clone(),
                            description: task.description.clone(),
                            due_date: task.due_date.clone(),
                            status: task.status.clone(),
                            priority: task.priority.clone(),
                            assigned_to: task.assigned_to.as_ref().map(|u| AssignedRef { id: u.id }),
                        };
                        if let Some(payload) = app.prompt_payload(Some(&defaults)) {
                            let controller = app.controller.clone();
                            tokio::spawn(async move {
                                let _ = controller.update_task(task.id, payload).await;
                            });
                        }
                    }
                }
                KeyCode::Char('d') => {
                    let selected = view
                        .column(TaskStatus::COLUMNS[app.selected_column])
                        .get(app.selected_task)
                        .map(|t| t.id);
                    if let Some(task_id) = selected {
                        let controller = app.controller.clone();
                        tokio::spawn(async move {
                            let _ = controller.delete_task(task_id).await;
                        });
                    }
                }
                KeyCode::Char('h') => {
                    let selected = view
                        .column(TaskStatus::COLUMNS[app.selected_column])
                        .get(app.selected_task)
                        .map(|t| t.id);
                    if let Some(task_id) = selected {
                        let entries = app.controller.load_history(task_id).await;
                        app.history = Some((task_id, entries));
                    }
                }
                KeyCode::Char('x') => export_all(app, today),
                KeyCode::Char('f') => app.cycle_status_filter(),
                KeyCode::Char('p') => app.cycle_priority_filter(),
                KeyCode::Char('s') => app.cycle_sort(),
                KeyCode::Char('c') => app.query.clear(),
                _ => {}
            }
        }
    }
}

/// Writes all three CSV exports next to the executable's working
/// directory and reports the outcome as a toast.
fn export_all(app: &BoardApp, today: NaiveDate) {
    let (tasks, users) = {
        let store = app.store.read();
        (store.tasks().to_vec(), store.users().to_vec())
    };
    let dir = Path::new(".");
    let result = export::write_export(dir, "tasks_export", &export::tasks_csv(&tasks, today), today)
        .and_then(|_| {
            export::write_export(
                dir,
                "users_report",
                &export::team_report_csv(&users, &tasks),
                today,
            )
        })
        .and_then(|_| {
            export::write_export(
                dir,
                "project_summary",
                &export::project_summary_csv(&tasks, &users, today),
                today,
            )
        });
    match result {
        Ok(_) => app.controller.raise_toast("Exported 3 CSV files"),
        Err(e) => {
            tracing::error!("CSV export failed: {:?}", e);
            app.controller.raise_toast("Failed to export CSV files");
        }
    }
}

fn draw(
    f: &mut ratatui::Frame,
    app: &BoardApp,
    view: &BoardView,
    stats: &BoardStats,
    notifications: &[Notification],
    toast: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app, stats, notifications.len());

    let main_area = if app.show_notifications {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);
        draw_notifications(f, split[1], notifications);
        split[0]
    } else {
        chunks[1]
    };

    if let Some((task_id, entries)) = &app.history {
        draw_history(f, main_area, *task_id, entries);
    } else {
        match app.view_mode {
            ViewMode::Board => draw_board(f, main_area, app, view),
            ViewMode::Dashboard => draw_dashboard(f, main_area, app, stats),
        }
    }

    let footer = match toast {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        None => Line::from(Span::raw(
            " q quit | arrows select | Enter/b move | a add | e edit | d delete | h history | f/p/s filter+sort | c clear | v dashboard | n notifications | x export | r reload",
        )),
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);
}

fn draw_header(
    f: &mut ratatui::Frame,
    area: Rect,
    app: &BoardApp,
    stats: &BoardStats,
    notification_count: usize,
) {
    let filters = format!(
        "filter: {} / {}  sort: {}",
        app.query
            .filter_status
            .map(|s| s.as_str())
            .unwrap_or("all statuses"),
        app.query
            .filter_priority
            .map(|p| p.as_str())
            .unwrap_or("all priorities"),
        match app.query.sort_by {
            Some(SortKey::DueDate) => "due date",
            Some(SortKey::Priority) => "priority",
            None => "none",
        },
    );
    let summary = format!(
        "{} tasks | {} in progress | {} done | {} high priority | {} overdue | {} notification(s)",
        stats.total,
        stats.in_progress,
        stats.done,
        stats.high_priority,
        stats.overdue,
        notification_count,
    );
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Team Task Board",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw(summary)),
        Line::from(Span::styled(filters, Style::default().fg(Color::DarkGray))),
    ]);
    f.render_widget(header, area);
}

fn priority_color(priority: &str) -> Color {
    match priority {
        "High" => Color::Red,
        "Medium" => Color::Yellow,
        "Low" => Color::Green,
        _ => Color::White,
    }
}

fn draw_board(f: &mut ratatui::Frame, area: Rect, app: &BoardApp, view: &BoardView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, status) in TaskStatus::COLUMNS.iter().enumerate() {
        let tasks = view.column(*status);
        let items: Vec<ListItem> = tasks
            .iter()
            .enumerate()
            .map(|(idx, t)| {
                let selected = app.selected_column == i && app.selected_task == idx;
                let mut spans = vec![
                    Span::raw(format!("[#{}] ", t.id)),
                    Span::styled(
                        t.title.clone(),
                        if selected {
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::White)
                        },
                    ),
                    Span::styled(
                        format!(" ({})", t.priority),
                        Style::default().fg(priority_color(&t.priority)),
                    ),
                ];
                if let Some(due) = t.due_date.as_deref() {
                    if !due.is_empty() {
                        spans.push(Span::raw(format!(" (Due: {})", due)));
                    }
                }
                if let Some(user) = &t.assigned_to {
                    spans.push(Span::styled(
                        format!(" @{}", user.username),
                        Style::default().fg(get_or_assign_user_color(&user.username)),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status, tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if app.selected_column == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD));

        f.render_widget(list, chunks[i]);
    }
}

fn draw_dashboard(f: &mut ratatui::Frame, area: Rect, app: &BoardApp, stats: &BoardStats) {
    let pct = |count: usize| {
        if stats.total == 0 {
            0
        } else {
            ((count as f64 / stats.total as f64) * 100.0).round() as u32
        }
    };
    let mut lines = vec![
        Line::from(Span::styled(
            "Project Dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw("")),
        Line::from(Span::raw(format!(
            "Completion rate: {}%   Productivity score: {}%",
            stats.completion_rate(),
            stats.productivity_score(),
        ))),
        Line::from(Span::raw("")),
        Line::from(Span::raw(format!(
            "Status       To Do {} ({}%) | In Progress {} ({}%) | Done {} ({}%)",
            stats.todo,
            pct(stats.todo),
            stats.in_progress,
            pct(stats.in_progress),
            stats.done,
            pct(stats.done),
        ))),
        Line::from(Span::raw(format!(
            "Priority     High {} ({}%) | Medium {} ({}%) | Low {} ({}%)",
            stats.high_priority,
            pct(stats.high_priority),
            stats.medium_priority,
            pct(stats.medium_priority),
            stats.low_priority,
            pct(stats.low_priority),
        ))),
        Line::from(Span::raw(format!(
            "Assignment   assigned {} | unassigned {} | overdue {}",
            stats.assigned, stats.unassigned, stats.overdue,
        ))),
        Line::from(Span::raw("")),
        Line::from(Span::styled(
            "Team Performance",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let (users, tasks) = {
        let store = app.store.read();
        (store.users().to_vec(), store.tasks().to_vec())
    };
    for entry in user_stats(&users, &tasks) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}", entry.user.username),
                Style::default().fg(get_or_assign_user_color(&entry.user.username)),
            ),
            Span::raw(format!(
                "  {} task(s), {} completed, {} in progress ({}%)",
                entry.task_count,
                entry.completed,
                entry.in_progress,
                entry.completion_rate(),
            )),
        ]));
    }

    let dashboard = Paragraph::new(lines).block(
        Block::default()
            .title("Dashboard (v to return)")
            .borders(Borders::ALL),
    );
    f.render_widget(dashboard, area);
}

fn draw_notifications(f: &mut ratatui::Frame, area: Rect, notifications: &[Notification]) {
    let items: Vec<ListItem> = if notifications.is_empty() {
        vec![ListItem::new(Line::from(Span::raw(
            "All caught up! No new notifications.",
        )))]
    } else {
        notifications
            .iter()
            .map(|n| {
                let color = match n.kind {
                    NotificationKind::Error => Color::Red,
                    NotificationKind::Warning => Color::Yellow,
                    NotificationKind::Info => Color::Blue,
                    NotificationKind::Success => Color::Green,
                };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        n.title.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::raw(n.message.clone())),
                ])
            })
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .title("Notifications")
            .borders(Borders::ALL),
    );
    f.render_widget(list, area);
}

fn draw_history(f: &mut ratatui::Frame, area: Rect, task_id: i64, entries: &[ChangeLogEntry]) {
    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(Line::from(Span::raw(
            "No history available for this task.",
        )))]
    } else {
        entries
            .iter()
            .map(|e| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        e.timestamp.clone(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(format!("  {}", e.action)),
                ]))
            })
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .title(format!("Task #{} History (Esc to close)", task_id))
            .borders(Borders::ALL),
    );
    f.render_widget(list, area);
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        enable_raw_mode().ok();
        Some(input.trim().to_string())
    } else {
        enable_raw_mode().ok();
        None
    }
}
