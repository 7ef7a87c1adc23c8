use crate::app::{App, MenuItem};
use crate::state::messages::DataRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    data_requests: &mpsc::Sender<DataRequest>,
) {
    let mut guard = app.lock().await;

    // The search box swallows typing until Enter or Esc.
    if guard.state.active_tab == MenuItem::Teams && guard.state.teams.searching {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Esc, _) => guard.state.teams.clear(),
            (KeyCode::Enter, _) => guard.state.teams.searching = false,
            (KeyCode::Backspace, _) => guard.state.teams.pop_char(),
            (KeyCode::Down, _) => guard.teams_down(),
            (KeyCode::Up, _) => guard.teams_up(),
            (Char(c), _) => guard.state.teams.push_char(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Teams),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Dashboard),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Squad),
        (_, Char('4'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('5'), _) => guard.update_tab(MenuItem::Fixtures),
        (_, Char('6'), _) => guard.update_tab(MenuItem::Venue),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Teams
        (MenuItem::Teams, Char('/'), _) => guard.state.teams.searching = true,
        (MenuItem::Teams, KeyCode::Enter, _) => {
            guard.teams_select();
        }
        (MenuItem::Teams, KeyCode::Esc, _) => guard.state.teams.clear(),

        // Dashboard
        (MenuItem::Dashboard, Char('l') | KeyCode::Right, _) => guard.state.dashboard.next_path_tab(),
        (MenuItem::Dashboard, Char('h') | KeyCode::Left, _) => guard.state.dashboard.prev_path_tab(),
        (MenuItem::Dashboard, Char('n'), _) => guard.next_scenario(),
        (MenuItem::Dashboard, Char('c'), _) => {
            if let Some(team_id) = guard.export_target() {
                drop(guard);
                let _ = data_requests
                    .send(DataRequest::ExportCalendar { team_id })
                    .await;
                return;
            }
        }

        // Fixtures
        (MenuItem::Fixtures, Char('l') | KeyCode::Right, _) => guard.state.fixtures.next_filter(),
        (MenuItem::Fixtures, Char('h') | KeyCode::Left, _) => guard.state.fixtures.prev_filter(),

        // Venues
        (MenuItem::Venue, Char('j') | KeyCode::Down, _) => guard.venue_down(),
        (MenuItem::Venue, Char('k') | KeyCode::Up, _) => guard.venue_up(),
        (MenuItem::Venue, Char('J') | KeyCode::PageDown, _) => {
            guard.state.venue.scroll_offset = guard.state.venue.scroll_offset.saturating_add(1);
        }
        (MenuItem::Venue, Char('K') | KeyCode::PageUp, _) => {
            guard.state.venue.scroll_offset = guard.state.venue.scroll_offset.saturating_sub(1);
        }

        // Scrolling
        (_, Char('j') | KeyCode::Down, _) => guard.scroll_down(),
        (_, Char('k') | KeyCode::Up, _) => guard.scroll_up(),

        // Global
        (_, Char('t'), _) => guard.cycle_timezone(),
        (_, Char('v'), _) => guard.toggle_venue_local(),
        (_, Char('d'), _) => guard.toggle_theme(),
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),
        (_, Char('r'), _) => {
            drop(guard);
            let _ = data_requests.send(DataRequest::LoadTournament).await;
        }

        _ => {}
    }
}
