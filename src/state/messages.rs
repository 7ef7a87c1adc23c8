use crate::state::worker::LoadingState;
use crossterm::event::KeyEvent;
use std::path::PathBuf;
use std::sync::Arc;
use wc26_core::FixtureStore;

#[derive(Debug, Clone)]
pub enum DataRequest {
    LoadTournament,
    ExportCalendar { team_id: String },
}

#[derive(Debug)]
pub enum DataResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TournamentLoaded { store: Arc<FixtureStore> },
    CalendarExported { path: PathBuf, events: usize },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
