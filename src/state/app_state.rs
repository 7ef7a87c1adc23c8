use crate::app::MenuItem;
use crate::state::preferences::Preferences;
use std::sync::Arc;
use wc26_core::{FixtureStore, Round};

// ---------------------------------------------------------------------------
// Teams tab
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamsState {
    pub query: String,
    /// Keys go to the search box instead of the key bindings.
    pub searching: bool,
    /// Index into the filtered team list.
    pub selected: usize,
}

impl TeamsState {
    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.selected = 0;
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.selected = 0;
        self.searching = false;
    }

    pub fn move_down(&mut self, visible: usize) {
        if self.selected + 1 < visible {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Dashboard: knockout path sub-tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathTab {
    #[default]
    First,
    Second,
    Third,
}

impl PathTab {
    pub const ALL: [PathTab; 3] = [PathTab::First, PathTab::Second, PathTab::Third];

    pub fn next(self) -> Self {
        match self {
            PathTab::First => PathTab::Second,
            PathTab::Second => PathTab::Third,
            PathTab::Third => PathTab::First,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PathTab::First => PathTab::Third,
            PathTab::Second => PathTab::First,
            PathTab::Third => PathTab::Second,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PathTab::First => "If 1st",
            PathTab::Second => "If 2nd",
            PathTab::Third => "If best 3rd",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PathTab::First => 0,
            PathTab::Second => 1,
            PathTab::Third => 2,
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub path_tab: PathTab,
    /// Which third-place scenario is shown on the "If best 3rd" sub-tab.
    pub scenario: usize,
    pub path_scroll: u16,
}

impl DashboardState {
    pub fn next_path_tab(&mut self) {
        self.path_tab = self.path_tab.next();
        self.path_scroll = 0;
    }

    pub fn prev_path_tab(&mut self) {
        self.path_tab = self.path_tab.prev();
        self.path_scroll = 0;
    }

    /// Cycle through `count` third-place scenarios.
    pub fn next_scenario(&mut self, count: usize) {
        self.scenario = if count == 0 { 0 } else { (self.scenario + 1) % count };
        self.path_scroll = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Fixtures tab
// ---------------------------------------------------------------------------

/// Filters offered on the Fixtures tab, `None` meaning every round.
pub const ROUND_FILTERS: [Option<Round>; 8] = [
    None,
    Some(Round::Group),
    Some(Round::RoundOf32),
    Some(Round::RoundOf16),
    Some(Round::QuarterFinal),
    Some(Round::SemiFinal),
    Some(Round::ThirdPlace),
    Some(Round::Final),
];

#[derive(Debug, Default)]
pub struct FixturesState {
    pub round_filter: Option<Round>,
    pub scroll_offset: u16,
}

impl FixturesState {
    pub fn next_filter(&mut self) {
        self.step_filter(1);
    }

    pub fn prev_filter(&mut self) {
        self.step_filter(ROUND_FILTERS.len() - 1);
    }

    fn step_filter(&mut self, step: usize) {
        let i = ROUND_FILTERS
            .iter()
            .position(|f| *f == self.round_filter)
            .unwrap_or(0);
        self.round_filter = ROUND_FILTERS[(i + step) % ROUND_FILTERS.len()];
        self.scroll_offset = 0;
    }
}

// ---------------------------------------------------------------------------
// Venue tab
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct VenueState {
    pub selected: usize,
    pub scroll_offset: u16,
}

impl VenueState {
    pub fn move_down(&mut self, count: usize) {
        if self.selected + 1 < count {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    /// One-line confirmation such as a finished export.
    pub status: Option<String>,
    pub store: Option<Arc<FixtureStore>>,
    pub prefs: Preferences,
    pub teams: TeamsState,
    pub dashboard: DashboardState,
    pub squad_scroll: u16,
    pub bracket_scroll: u16,
    pub fixtures: FixturesState,
    pub venue: VenueState,
}

impl AppState {
    pub fn new(prefs: Preferences) -> Self {
        let active_tab = if prefs.team.is_some() {
            MenuItem::Dashboard
        } else {
            MenuItem::Teams
        };
        Self {
            active_tab,
            previous_tab: active_tab,
            prefs,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_filter_wraps_both_ways() {
        let mut fixtures = FixturesState::default();
        fixtures.prev_filter();
        assert_eq!(fixtures.round_filter, Some(Round::Final));
        fixtures.next_filter();
        assert_eq!(fixtures.round_filter, None);
        fixtures.next_filter();
        assert_eq!(fixtures.round_filter, Some(Round::Group));
    }

    #[test]
    fn path_tabs_cycle() {
        let mut dashboard = DashboardState::default();
        for expected in [PathTab::Second, PathTab::Third, PathTab::First] {
            dashboard.next_path_tab();
            assert_eq!(dashboard.path_tab, expected);
        }
        dashboard.prev_path_tab();
        assert_eq!(dashboard.path_tab, PathTab::Third);
    }

    #[test]
    fn scenario_cycle_handles_empty_list() {
        let mut dashboard = DashboardState::default();
        dashboard.next_scenario(0);
        assert_eq!(dashboard.scenario, 0);
        dashboard.next_scenario(3);
        dashboard.next_scenario(3);
        dashboard.next_scenario(3);
        assert_eq!(dashboard.scenario, 0);
    }

    #[test]
    fn team_cursor_stays_in_range() {
        let mut teams = TeamsState::default();
        teams.move_up();
        assert_eq!(teams.selected, 0);
        teams.move_down(2);
        teams.move_down(2);
        assert_eq!(teams.selected, 1);
        teams.push_char('m');
        assert_eq!(teams.selected, 0);
    }

    #[test]
    fn saved_team_opens_dashboard() {
        let prefs = Preferences { team: Some("mex".into()), ..Preferences::default() };
        assert_eq!(AppState::new(prefs).active_tab, MenuItem::Dashboard);
        assert_eq!(AppState::new(Preferences::default()).active_tab, MenuItem::Teams);
    }
}
