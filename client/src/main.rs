// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::io;
use std::sync::Arc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use parking_lot::RwLock;
use ratatui::{Terminal, backend::CrosstermBackend};

use client::api::ApiClient;
use client::mutation::MutationController;
use client::store::TaskStore;
use client::ui::{BoardApp, run_app};

// Default backend location; override with TASKBOARD_API_URL.
const DEFAULT_API_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let base_url =
        std::env::var("TASKBOARD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    tracing::info!("Connecting to the task backend at {}", base_url);

    let api = ApiClient::new(&base_url);

    // Initial load is fail-soft: a missing backend just means an empty
    // board, never a refusal to start.
    let mut store = TaskStore::new();
    store.load(&api).await;
    let store = Arc::new(RwLock::new(store));
    let controller = Arc::new(MutationController::new(api.clone(), store.clone()));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = BoardApp::new(api, store, controller);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    Ok(())
}
