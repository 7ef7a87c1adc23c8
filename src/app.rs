use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::preferences::Preferences;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use wc26_core::timezone::TimezoneMode;
use wc26_core::{FixtureStore, Team};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Teams,
    Dashboard,
    Squad,
    Bracket,
    Fixtures,
    Venue,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    /// Zone to return to when venue-local mode is switched off.
    zone_before_venue_local: Option<TimezoneMode>,
    /// Where preference changes are saved; `None` keeps them in memory.
    prefs_path: Option<PathBuf>,
}

impl App {
    pub fn new() -> Self {
        let path = Preferences::path();
        let prefs = Preferences::load_from(&path);
        Self::with_preferences(AppSettings::load(), prefs, Some(path))
    }

    pub fn with_preferences(settings: AppSettings, prefs: Preferences, prefs_path: Option<PathBuf>) -> Self {
        let app = Self {
            state: AppState::new(prefs),
            settings,
            zone_before_venue_local: None,
            prefs_path,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Worker response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_tournament_loaded(&mut self, store: Arc<FixtureStore>) {
        self.state.last_error = None;
        if let Some(id) = self.state.prefs.team.as_deref()
            && store.team(id).is_none()
        {
            warn!("saved team {id} is not in the tournament data");
            self.state.prefs.team = None;
            self.state.active_tab = MenuItem::Teams;
        }
        self.state.store = Some(store);
    }

    pub fn on_calendar_exported(&mut self, path: PathBuf, events: usize) {
        self.state.last_error = None;
        self.state.status = Some(format!("Saved {events} matches to {}", path.display()));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.status = None;
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.status = None;
        self.state.teams.searching = false;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Team selection
    // -----------------------------------------------------------------------

    pub fn selected_team(&self) -> Option<&Team> {
        let store = self.state.store.as_deref()?;
        store.team(self.state.prefs.team.as_deref()?)
    }

    /// Teams matching the search box, in store order.
    pub fn visible_teams(&self) -> Vec<&Team> {
        self.state
            .store
            .as_deref()
            .map(|store| store.search_teams(&self.state.teams.query))
            .unwrap_or_default()
    }

    pub fn teams_down(&mut self) {
        let visible = self.visible_teams().len();
        self.state.teams.move_down(visible);
    }

    pub fn teams_up(&mut self) {
        self.state.teams.move_up();
    }

    /// Pick the team under the cursor. Teams still in a play-off are not selectable.
    pub fn teams_select(&mut self) -> bool {
        let Some((id, name, qualified)) = self
            .visible_teams()
            .get(self.state.teams.selected)
            .map(|t| (t.id.clone(), t.name.clone(), t.qualified))
        else {
            return false;
        };
        if !qualified {
            debug!("{id} has not qualified yet");
            self.state.status = Some(format!("{name} has not qualified yet"));
            return false;
        }
        info!("selected team {id}");
        self.state.prefs.team = Some(id);
        self.state.dashboard.reset();
        self.state.squad_scroll = 0;
        self.state.teams.clear();
        self.save_preferences();
        self.update_tab(MenuItem::Dashboard);
        true
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    pub fn cycle_timezone(&mut self) {
        self.state.prefs.timezone = self.state.prefs.timezone.cycle();
        self.zone_before_venue_local = None;
        self.save_preferences();
    }

    pub fn toggle_venue_local(&mut self) {
        let prefs = &mut self.state.prefs;
        if prefs.timezone.is_venue_local() {
            prefs.timezone = self
                .zone_before_venue_local
                .take()
                .unwrap_or_else(TimezoneMode::detect);
        } else {
            let previous = std::mem::replace(&mut prefs.timezone, TimezoneMode::VenueLocal);
            self.zone_before_venue_local = Some(previous);
        }
        self.save_preferences();
    }

    pub fn toggle_theme(&mut self) {
        self.state.prefs.theme = self.state.prefs.theme.toggle();
        self.save_preferences();
    }

    fn save_preferences(&self) {
        let Some(path) = self.prefs_path.as_deref() else {
            return;
        };
        if let Err(e) = self.state.prefs.save_to(path) {
            warn!("{e}");
        }
    }

    // -----------------------------------------------------------------------
    // Dashboard
    // -----------------------------------------------------------------------

    /// Team id to export, if one is selected.
    pub fn export_target(&mut self) -> Option<String> {
        let id = self.selected_team().map(|t| t.id.clone());
        if id.is_none() {
            self.state.status = Some("Pick a team first".to_string());
        }
        id
    }

    pub fn next_scenario(&mut self) {
        let count = match (self.state.store.as_deref(), self.selected_team()) {
            (Some(store), Some(team)) => store
                .fixtures_in_round(wc26_core::Round::RoundOf32)
                .iter()
                .flat_map(|f| [&f.home, &f.away])
                .filter(|slot| slot.pool_includes(team.group))
                .count(),
            _ => 0,
        };
        self.state.dashboard.next_scenario(count);
    }

    pub fn scroll_down(&mut self) {
        let state = &mut self.state;
        match state.active_tab {
            MenuItem::Dashboard => state.dashboard.path_scroll = state.dashboard.path_scroll.saturating_add(1),
            MenuItem::Squad => state.squad_scroll = state.squad_scroll.saturating_add(1),
            MenuItem::Bracket => state.bracket_scroll = state.bracket_scroll.saturating_add(1),
            MenuItem::Fixtures => state.fixtures.scroll_offset = state.fixtures.scroll_offset.saturating_add(1),
            MenuItem::Venue => state.venue.scroll_offset = state.venue.scroll_offset.saturating_add(1),
            MenuItem::Teams => self.teams_down(),
            MenuItem::Help => {}
        }
    }

    pub fn scroll_up(&mut self) {
        let state = &mut self.state;
        match state.active_tab {
            MenuItem::Dashboard => state.dashboard.path_scroll = state.dashboard.path_scroll.saturating_sub(1),
            MenuItem::Squad => state.squad_scroll = state.squad_scroll.saturating_sub(1),
            MenuItem::Bracket => state.bracket_scroll = state.bracket_scroll.saturating_sub(1),
            MenuItem::Fixtures => state.fixtures.scroll_offset = state.fixtures.scroll_offset.saturating_sub(1),
            MenuItem::Venue => state.venue.scroll_offset = state.venue.scroll_offset.saturating_sub(1),
            MenuItem::Teams => self.teams_up(),
            MenuItem::Help => {}
        }
    }

    pub fn venue_down(&mut self) {
        let count = self.state.store.as_deref().map(|s| s.venues().len()).unwrap_or(0);
        self.state.venue.move_down(count);
    }

    pub fn venue_up(&mut self) {
        self.state.venue.move_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::theme::Theme;
    use pretty_assertions::assert_eq;

    fn loaded_app(prefs: Preferences) -> App {
        let mut app = App::with_preferences(AppSettings::default(), prefs, None);
        let store = FixtureStore::embedded().expect("embedded data should parse");
        app.on_tournament_loaded(Arc::new(store));
        app
    }

    fn london() -> Preferences {
        Preferences {
            team: None,
            timezone: TimezoneMode::Zone("Europe/London".into()),
            theme: Theme::Dark,
        }
    }

    #[test]
    fn selecting_a_team_opens_dashboard() {
        let mut app = loaded_app(london());
        app.state.teams.query = "mexico".into();
        assert!(app.teams_select());
        assert_eq!(app.state.prefs.team.as_deref(), Some("mex"));
        assert_eq!(app.state.active_tab, MenuItem::Dashboard);
        assert_eq!(app.state.teams.query, "");
    }

    #[test]
    fn unqualified_team_is_not_selectable() {
        let mut app = loaded_app(london());
        let playoff = app
            .visible_teams()
            .iter()
            .position(|t| !t.qualified)
            .expect("a play-off placeholder");
        app.state.teams.selected = playoff;
        assert!(!app.teams_select());
        assert_eq!(app.state.prefs.team, None);
        assert_eq!(app.state.active_tab, MenuItem::Teams);
    }

    #[test]
    fn empty_search_selects_nothing() {
        let mut app = loaded_app(london());
        app.state.teams.query = "zzzz".into();
        assert!(app.visible_teams().is_empty());
        assert!(!app.teams_select());
    }

    #[test]
    fn stale_saved_team_is_dropped() {
        let prefs = Preferences { team: Some("atl".into()), ..london() };
        let app = loaded_app(prefs);
        assert_eq!(app.state.prefs.team, None);
        assert_eq!(app.state.active_tab, MenuItem::Teams);
    }

    #[test]
    fn venue_local_toggle_restores_previous_zone() {
        let mut app = loaded_app(london());
        app.cycle_timezone();
        let paris = app.state.prefs.timezone.clone();
        assert_eq!(paris, TimezoneMode::Zone("Europe/Paris".into()));
        app.toggle_venue_local();
        assert!(app.state.prefs.timezone.is_venue_local());
        app.toggle_venue_local();
        assert_eq!(app.state.prefs.timezone, paris);
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = loaded_app(london());
        app.update_tab(MenuItem::Bracket);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Bracket);
    }

    #[test]
    fn export_needs_a_team() {
        let mut app = loaded_app(london());
        assert_eq!(app.export_target(), None);
        assert_eq!(app.state.status.as_deref(), Some("Pick a team first"));
        app.state.prefs.team = Some("can".into());
        assert_eq!(app.export_target().as_deref(), Some("can"));
    }
}
