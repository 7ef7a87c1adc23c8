use crate::state::messages::{DataRequest, DataResponse};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use wc26_core::calendar::{generate_ics, ics_file_name};
use wc26_core::integrity::check_bracket;
use wc26_core::{FixtureStore, StoreError};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

#[derive(Debug)]
pub enum WorkerError {
    Store(StoreError),
    Export(std::io::Error, PathBuf),
    NotLoaded,
    UnknownTeam(String),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Store(e) => write!(f, "{e}"),
            WorkerError::Export(e, path) => write!(f, "Could not write {}: {e}", path.display()),
            WorkerError::NotLoaded => write!(f, "Tournament data is not loaded yet"),
            WorkerError::UnknownTeam(id) => write!(f, "Unknown team {id}"),
        }
    }
}

impl From<StoreError> for WorkerError {
    fn from(e: StoreError) -> Self {
        WorkerError::Store(e)
    }
}

/// Owns the tournament data and performs the slow or fallible work
/// (loading, file export) off the UI loop.
pub struct DataWorker {
    store: Option<Arc<FixtureStore>>,
    export_dir: PathBuf,
    requests: mpsc::Receiver<DataRequest>,
    responses: mpsc::Sender<DataResponse>,
    is_loading: Arc<AtomicBool>,
}

impl DataWorker {
    pub fn new(
        export_dir: PathBuf,
        requests: mpsc::Receiver<DataRequest>,
        responses: mpsc::Sender<DataResponse>,
    ) -> Self {
        Self {
            store: None,
            export_dir,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                DataRequest::LoadTournament => self.handle_load_tournament(),
                DataRequest::ExportCalendar { team_id } => self.handle_export_calendar(team_id).await,
            };

            debug!("data request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| DataResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send data response: {e}");
                break;
            }
        }
    }

    fn handle_load_tournament(&mut self) -> Result<DataResponse, WorkerError> {
        debug!("loading tournament data");
        let store = Arc::new(FixtureStore::load()?);
        for issue in check_bracket(&store) {
            warn!("bracket data: {issue}");
        }
        info!(
            "loaded {} teams, {} venues, {} fixtures",
            store.teams().len(),
            store.venues().len(),
            store.fixtures().count()
        );
        self.store = Some(store.clone());
        Ok(DataResponse::TournamentLoaded { store })
    }

    async fn handle_export_calendar(&self, team_id: String) -> Result<DataResponse, WorkerError> {
        let store = self.store.as_ref().ok_or(WorkerError::NotLoaded)?;
        if store.team(&team_id).is_none() {
            return Err(WorkerError::UnknownTeam(team_id));
        }
        let fixtures = store.team_fixtures(&team_id);
        let ics = generate_ics(store, &fixtures, &team_id);
        let path = self.export_dir.join(ics_file_name(&team_id));
        debug!("writing {} events to {}", fixtures.len(), path.display());
        tokio::fs::write(&path, ics)
            .await
            .map_err(|e| WorkerError::Export(e, path.clone()))?;
        info!("exported calendar to {}", path.display());
        Ok(DataResponse::CalendarExported { path, events: fixtures.len() })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(DataResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(DataResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(DataResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
