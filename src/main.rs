mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::messages::{DataRequest, DataResponse, UiEvent};
use crate::state::worker::{DataWorker, LoadingState};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};
use wc26_core::FixtureStore;
use wc26_core::integrity::check_bracket;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let app = App::new();
    let export_dir = app.settings.export_dir.clone();
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (data_req_tx, data_req_rx) = mpsc::channel::<DataRequest>(100);
    let (data_resp_tx, data_resp_rx) = mpsc::channel::<DataResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Data thread
    let data_worker = DataWorker::new(export_dir, data_req_rx, data_resp_tx);
    let data_task = tokio::spawn(data_worker.run());

    // Trigger tournament load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, data_req_tx, data_resp_rx).await;

    input_handler.abort();
    data_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("wc26tui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        "--check" => std::process::exit(run_check()),
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

/// Validate the tournament data without starting the UI.
fn run_check() -> i32 {
    let store = match FixtureStore::load() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not load tournament data: {e}");
            return 1;
        }
    };
    let issues = check_bracket(&store);
    if issues.is_empty() {
        println!(
            "OK: {} teams, {} venues, {} fixtures",
            store.teams().len(),
            store.venues().len(),
            store.fixtures().count()
        );
        return 0;
    }
    for issue in &issues {
        eprintln!("{issue}");
    }
    eprintln!("{} bracket issue(s) found", issues.len());
    1
}

fn usage_text() -> &'static str {
    "wc26tui - FIFA World Cup 2026 terminal companion

Usage:
  wc26tui
  wc26tui --check
  wc26tui --help
  wc26tui --version

Environment:
  WC26_DATA_DIR     Directory with teams/venues/fixtures/groups/squads JSON (default: embedded)
  WC26_EXPORT_DIR   Where .ics calendar exports are written (default: current directory)
  WC26_LOG          Log level: error, warn, info, debug, trace
  TZ                Initial display timezone when no preference is saved"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    data_requests: mpsc::Sender<DataRequest>,
    mut data_responses: mpsc::Receiver<DataResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &data_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = data_responses.recv() => {
                let should_redraw = handle_data_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    data_requests: &mpsc::Sender<DataRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = data_requests.send(DataRequest::LoadTournament).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, data_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_data_response(
    response: DataResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        DataResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        DataResponse::TournamentLoaded { store } => {
            app.lock().await.on_tournament_loaded(store);
        }
        DataResponse::CalendarExported { path, events } => {
            app.lock().await.on_calendar_exported(path, events);
        }
        DataResponse::Error { message } => {
            error!("{message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Hide);
    let _ = execute!(stdout, terminal::EnterAlternateScreen);
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = terminal::enable_raw_mode();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
