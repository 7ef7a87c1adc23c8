use log::error;
use std::collections::{BTreeMap, BTreeSet};
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;
use wc26_core::timezone::{TimezoneMode, format_match_date, format_match_time};
use wc26_core::{BracketTracer, Fixture, FixtureStore, KnockoutPathService, Round, Team};

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketView, cell_width_for, stacked_lines};
use crate::components::knockout_path::KnockoutPathView;
use crate::components::theme::{Theme, ThemeColor, resolve};
use crate::state::app_state::PathTab;
use crate::state::worker::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;

static TABS: &[&str; 6] = &["Teams", "Dashboard", "Squad", "Bracket", "Fixtures", "Venues"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        let theme = app.state.prefs.theme;
        match app.state.store.clone() {
            None => draw_loading_or_error(f, layout.main, app),
            Some(store) => match app.state.active_tab {
                MenuItem::Teams => draw_teams(f, layout.main, app, &store),
                MenuItem::Dashboard => draw_dashboard(f, layout.main, app, &store),
                MenuItem::Squad => draw_squad(f, layout.main, app, &store),
                MenuItem::Bracket => draw_bracket(f, layout.main, app, &store),
                MenuItem::Fixtures => draw_fixtures(f, layout.main, app, &store),
                MenuItem::Venue => draw_venue(f, layout.main, app, &store),
                MenuItem::Help => draw_help(f, layout.main, theme),
            },
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs, theme);
        }
        draw_status_line(f, layout.main, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(theme: Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(resolve(ThemeColor::Border, theme))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let theme = app.state.prefs.theme;
    let style = resolve(ThemeColor::Text, theme);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Teams | MenuItem::Help => 0,
        MenuItem::Dashboard => 1,
        MenuItem::Squad => 2,
        MenuItem::Bracket => 3,
        MenuItem::Fixtures => 4,
        MenuItem::Venue => 5,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type)
                .border_style(resolve(ThemeColor::Border, theme)),
        )
        .highlight_style(resolve(ThemeColor::Primary, theme).add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new(format!("{}  ? ", app.state.prefs.timezone.abbr()))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type)
                .border_style(resolve(ThemeColor::Border, theme)),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_loading_or_error(f: &mut Frame, area: Rect, app: &App) {
    let msg = match app.state.last_error.as_deref() {
        Some(err) => format!("Tournament data failed to load:\n{err}\n\nPress r to retry"),
        None => "Loading tournament data...".to_string(),
    };
    draw_placeholder(f, area, app.state.prefs.theme, " World Cup 2026 ", &msg);
}

/// Bordered panel with a centred message, used for every empty state.
fn draw_placeholder(f: &mut Frame, area: Rect, theme: Theme, title: &str, msg: &str) {
    let block = default_border(theme).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(msg.lines().count() as u16),
        Constraint::Fill(1),
    ])
    .areas(inner);
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(resolve(ThemeColor::Dim, theme))
            .alignment(Alignment::Center),
        middle,
    );
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore) {
    let theme = app.state.prefs.theme;
    let block = default_border(theme).title(" Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [search_area, _, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let teams_state = &app.state.teams;
    let search = if teams_state.searching {
        Line::from(vec![
            Span::styled("Search: ", resolve(ThemeColor::Accent, theme)),
            Span::styled(format!("{}_", teams_state.query), resolve(ThemeColor::Text, theme)),
        ])
    } else if teams_state.query.is_empty() {
        Line::styled("/ search  ↑/↓ move  Enter select", resolve(ThemeColor::Dim, theme))
    } else {
        Line::from(vec![
            Span::styled("Filter: ", resolve(ThemeColor::Dim, theme)),
            Span::styled(teams_state.query.clone(), resolve(ThemeColor::Text, theme)),
            Span::styled("  (Esc to clear)", resolve(ThemeColor::Dim, theme)),
        ])
    };
    f.render_widget(Paragraph::new(search), search_area);

    let teams = store.search_teams(&teams_state.query);
    if teams.is_empty() {
        f.render_widget(
            Paragraph::new(format!("No teams match \"{}\"", teams_state.query))
                .style(resolve(ThemeColor::Dim, theme))
                .alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let lines = team_list_lines(&teams, teams_state.selected, app.state.prefs.team.as_deref(), theme);
    let scroll = (teams_state.selected as u16).saturating_sub(list_area.height.saturating_sub(1));
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), list_area);
}

fn team_list_lines(teams: &[&Team], selected: usize, saved: Option<&str>, theme: Theme) -> Vec<Line<'static>> {
    teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let marker = if saved == Some(team.id.as_str()) { "★" } else { " " };
            let rank = team
                .fifa_ranking
                .map(|r| format!("#{r}"))
                .unwrap_or_else(|| "-".to_string());
            let mut text = format!(
                "{marker} Group {}  {:<24} {:>4}  {}",
                team.group, team.name, rank, team.confederation
            );
            if !team.qualified {
                text.push_str("  (play-off)");
            }
            let style = if i == selected {
                resolve(ThemeColor::Selected, theme)
            } else if !team.qualified {
                resolve(ThemeColor::Dim, theme)
            } else if marker == "★" {
                resolve(ThemeColor::Ours, theme)
            } else {
                resolve(ThemeColor::Text, theme)
            };
            Line::styled(text, style)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore) {
    let theme = app.state.prefs.theme;
    let Some(team) = app.selected_team() else {
        draw_placeholder(f, area, theme, " Dashboard ", "No team selected\nPick one on the Teams tab (1)");
        return;
    };
    let mode = &app.state.prefs.timezone;

    let [header, body] = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);
    draw_team_header(f, header, team, mode, theme);

    let [left, right] = if body.width >= 110 {
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body)
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body)
    };

    let [fixtures_area, table_area, venues_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Length(5),
    ])
    .areas(left);

    let fixtures = default_border(theme).title(format!(" Group {} fixtures ", team.group));
    let inner = fixtures.inner(fixtures_area);
    f.render_widget(fixtures, fixtures_area);
    f.render_widget(
        Paragraph::new(group_fixture_lines(store, team, mode, theme)),
        inner,
    );

    let table = default_border(theme).title(format!(" Group {} ", team.group));
    let inner = table.inner(table_area);
    f.render_widget(table, table_area);
    f.render_widget(Paragraph::new(group_table_lines(store, team, theme)), inner);

    let venues = default_border(theme).title(" Venues ");
    let inner = venues.inner(venues_area);
    f.render_widget(venues, venues_area);
    f.render_widget(Paragraph::new(team_venue_lines(store, team, theme)), inner);

    draw_knockout_path(f, right, app, store, team);
}

fn draw_team_header(f: &mut Frame, area: Rect, team: &Team, mode: &TimezoneMode, theme: Theme) {
    let block = default_border(theme);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let rank = team
        .fifa_ranking
        .map(|r| format!("FIFA #{r}"))
        .unwrap_or_else(|| "Unranked".to_string());
    let line = Line::from(vec![
        Span::styled(team.name.clone(), resolve(ThemeColor::Ours, theme)),
        Span::styled(
            format!("   Group {}  ·  {rank}  ·  {}", team.group, team.confederation),
            resolve(ThemeColor::Text, theme),
        ),
    ]);
    let [left, right] = Layout::horizontal([Constraint::Fill(1), Constraint::Length(34)]).areas(inner);
    f.render_widget(Paragraph::new(line), left);
    f.render_widget(
        Paragraph::new(format!("Times: {}", mode.label()))
            .style(resolve(ThemeColor::Dim, theme))
            .alignment(Alignment::Right),
        right,
    );
}

/// The group's six fixtures under matchday headings, ours highlighted.
fn group_fixture_lines(store: &FixtureStore, team: &Team, mode: &TimezoneMode, theme: Theme) -> Vec<Line<'static>> {
    let mut by_matchday: BTreeMap<u8, Vec<&Fixture>> = BTreeMap::new();
    for fixture in store.group_fixtures(team.group) {
        by_matchday.entry(fixture.matchday.unwrap_or(0)).or_default().push(fixture);
    }

    let mut lines = Vec::new();
    for (matchday, fixtures) in by_matchday {
        let heading = if matchday == 0 {
            "Unscheduled".to_string()
        } else {
            format!("Matchday {matchday}")
        };
        lines.push(Line::styled(heading, resolve(ThemeColor::Accent, theme)));
        for fixture in fixtures {
            let style = if fixture.involves_team(&team.id) {
                resolve(ThemeColor::Ours, theme)
            } else {
                resolve(ThemeColor::Text, theme)
            };
            lines.push(fixture_line(store, fixture, mode, theme, style, true));
        }
    }
    lines
}

fn group_table_lines(store: &FixtureStore, team: &Team, theme: Theme) -> Vec<Line<'static>> {
    let mut teams = store.group_teams(team.group);
    teams.sort_by_key(|t| t.ranking_key());
    teams
        .iter()
        .map(|t| {
            let rank = t
                .fifa_ranking
                .map(|r| format!("#{r}"))
                .unwrap_or_else(|| "-".to_string());
            let style = if t.id == team.id {
                resolve(ThemeColor::Ours, theme)
            } else if !t.qualified {
                resolve(ThemeColor::Dim, theme)
            } else {
                resolve(ThemeColor::Text, theme)
            };
            Line::styled(format!("{:>4}  {:<24} {}", rank, t.name, t.confederation), style)
        })
        .collect()
}

fn team_venue_lines(store: &FixtureStore, team: &Team, theme: Theme) -> Vec<Line<'static>> {
    let mut seen = BTreeSet::new();
    store
        .team_fixtures(&team.id)
        .into_iter()
        .filter(|f| seen.insert(f.venue.clone()))
        .map(|f| match store.venue(&f.venue) {
            Some(v) => Line::styled(
                format!("{}, {}  ({} seats)", v.name, v.display_city, v.capacity),
                resolve(ThemeColor::Text, theme),
            ),
            None => Line::styled(f.venue.clone(), resolve(ThemeColor::Dim, theme)),
        })
        .collect()
}

fn draw_knockout_path(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore, team: &Team) {
    let theme = app.state.prefs.theme;
    let dashboard = &app.state.dashboard;
    let block = default_border(theme).title(" Knockout path ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [tabs_area, info_area, path_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let titles: Vec<Line> = PathTab::ALL.iter().map(|t| Line::from(t.label())).collect();
    f.render_widget(
        Tabs::new(titles)
            .select(dashboard.path_tab.index())
            .style(resolve(ThemeColor::Dim, theme))
            .highlight_style(resolve(ThemeColor::Primary, theme).add_modifier(Modifier::UNDERLINED)),
        tabs_area,
    );
    f.render_widget(
        Paragraph::new("h/l switch  n next scenario  j/k scroll  c export .ics")
            .style(resolve(ThemeColor::Dim, theme)),
        hint_area,
    );

    let service = KnockoutPathService::new(store);
    let mode = &app.state.prefs.timezone;
    let (info, steps) = match dashboard.path_tab {
        PathTab::First => (
            format!("If {} win Group {}", team.short_name, team.group),
            service.path_for_first_place(team.group),
        ),
        PathTab::Second => (
            format!("If {} finish 2nd in Group {}", team.short_name, team.group),
            service.path_for_second_place(team.group),
        ),
        PathTab::Third => {
            let scenarios = service.paths_for_qualifying_third(team.group);
            let index = dashboard.scenario % scenarios.len().max(1);
            match scenarios.get(index) {
                None => (
                    format!("Group {} third place cannot reach the Round of 32", team.group),
                    None,
                ),
                Some(scenario) => {
                    let opponent = scenario
                        .opponent
                        .as_ref()
                        .map(|o| o.label.clone())
                        .unwrap_or_else(|| "TBD".to_string());
                    let venue = scenario
                        .venue
                        .as_ref()
                        .map(|v| format!(" in {}", v.display_city))
                        .unwrap_or_default();
                    (
                        format!(
                            "Scenario {}/{}: slot {} in Match {}{venue}, vs {opponent}",
                            index + 1,
                            scenarios.len(),
                            scenario.pool,
                            scenario.r32_match,
                        ),
                        Some(scenario.path.clone()),
                    )
                }
            }
        }
    };

    f.render_widget(
        Paragraph::new(info)
            .style(resolve(ThemeColor::Text, theme))
            .wrap(Wrap { trim: true }),
        info_area,
    );

    match steps {
        Some(steps) if !steps.is_empty() => f.render_widget(
            KnockoutPathView {
                steps: &steps,
                store,
                mode,
                theme,
                scroll_offset: dashboard.path_scroll,
            },
            path_area,
        ),
        _ => f.render_widget(
            Paragraph::new("Route not available")
                .style(resolve(ThemeColor::Dim, theme))
                .alignment(Alignment::Center),
            path_area,
        ),
    }
}

// ---------------------------------------------------------------------------
// Squad
// ---------------------------------------------------------------------------

fn draw_squad(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore) {
    let theme = app.state.prefs.theme;
    let Some(team) = app.selected_team() else {
        draw_placeholder(f, area, theme, " Squad ", "No team selected\nPick one on the Teams tab (1)");
        return;
    };
    let squad = store.squad_by_position(&team.id);
    let title = format!(" {} squad ", team.name);
    if squad.is_empty() {
        draw_placeholder(f, area, theme, &title, "Squad not announced yet");
        return;
    }

    let block = default_border(theme).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let dim = resolve(ThemeColor::Dim, theme);
    let text = resolve(ThemeColor::Text, theme);
    let mut lines = Vec::new();
    for (position, players) in squad {
        lines.push(Line::styled(position.label(), resolve(ThemeColor::Accent, theme)));
        for p in players {
            let number = p.number.map(|n| n.to_string()).unwrap_or_default();
            let stats = [
                p.age.map(|a| format!("age {a}")),
                p.caps.map(|c| format!("{c} caps")),
                p.goals.map(|g| format!("{g} goals")),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
            lines.push(Line::from(vec![
                Span::styled(format!("{number:>3}  "), dim),
                Span::styled(format!("{:<28}", p.name), text),
                Span::styled(format!("{:<24}", p.club.as_deref().unwrap_or("")), dim),
                Span::styled(stats, dim),
            ]));
        }
        lines.push(Line::default());
    }
    f.render_widget(Paragraph::new(lines).scroll((app.state.squad_scroll, 0)), inner);
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore) {
    let theme = app.state.prefs.theme;
    let block = default_border(theme).title(" Knockout bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, content] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    let mode = &app.state.prefs.timezone;
    let highlight = highlighted_matches(app, store);

    let header_text = match app.selected_team() {
        Some(team) => format!("Highlighted: {} as Group {} winners  ·  j/k scroll", team.short_name, team.group),
        None => "j/k scroll".to_string(),
    };
    f.render_widget(
        Paragraph::new(header_text).style(resolve(ThemeColor::Dim, theme)),
        header,
    );

    let split = BracketTracer::new(store).split_bracket();
    match split {
        Some(split) if cell_width_for(content.width).is_some() => f.render_widget(
            BracketView {
                split: &split,
                store,
                mode,
                theme,
                highlight: &highlight,
                scroll_offset: app.state.bracket_scroll,
            },
            content,
        ),
        Some(_) => f.render_widget(
            Paragraph::new(stacked_lines(store, mode, theme, &highlight)).scroll((app.state.bracket_scroll, 0)),
            content,
        ),
        None => f.render_widget(
            Paragraph::new("Bracket not available")
                .style(resolve(ThemeColor::Dim, theme))
                .alignment(Alignment::Center),
            content,
        ),
    }
}

/// Matches on the selected team's route as group winner.
fn highlighted_matches(app: &App, store: &FixtureStore) -> BTreeSet<u16> {
    app.selected_team()
        .and_then(|team| KnockoutPathService::new(store).path_for_first_place(team.group))
        .map(|steps| steps.iter().map(|s| s.match_number).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn draw_fixtures(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore) {
    let theme = app.state.prefs.theme;
    let filter = app.state.fixtures.round_filter;
    let title = match filter {
        Some(round) => format!(" Fixtures: {} ", round.label()),
        None => " Fixtures: all rounds ".to_string(),
    };
    let block = default_border(theme).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, content] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("h/l round filter  j/k scroll").style(resolve(ThemeColor::Dim, theme)),
        header,
    );

    let our_team = app.state.prefs.team.as_deref();
    let lines = fixture_list_lines(store, filter, &app.state.prefs.timezone, theme, our_team);
    if lines.is_empty() {
        f.render_widget(
            Paragraph::new("No fixtures for this round")
                .style(resolve(ThemeColor::Dim, theme))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }
    f.render_widget(Paragraph::new(lines).scroll((app.state.fixtures.scroll_offset, 0)), content);
}

/// Fixtures in kickoff order under local-date headings.
fn fixture_list_lines(
    store: &FixtureStore,
    filter: Option<Round>,
    mode: &TimezoneMode,
    theme: Theme,
    our_team: Option<&str>,
) -> Vec<Line<'static>> {
    let mut fixtures: Vec<&Fixture> = store
        .fixtures()
        .filter(|f| filter.is_none_or(|round| f.round == round))
        .collect();
    fixtures.sort_by_key(|f| (f.kickoff(), f.match_number));

    let mut lines = Vec::new();
    let mut current_date = String::new();
    for fixture in fixtures {
        let venue = store.venue(&fixture.venue);
        let date = format_match_date(fixture.kickoff(), mode, venue);
        if date != current_date {
            if !current_date.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::styled(date.clone(), resolve(ThemeColor::Accent, theme)));
            current_date = date;
        }
        let ours = our_team.is_some_and(|id| fixture.involves_team(id));
        let style = if ours {
            resolve(ThemeColor::Ours, theme)
        } else {
            resolve(ThemeColor::Text, theme)
        };
        lines.push(fixture_line(store, fixture, mode, theme, style, false));
    }
    lines
}

/// "  20:00  #1  Mexico v South Africa  Estadio Azteca, Mexico City"
fn fixture_line(
    store: &FixtureStore,
    fixture: &Fixture,
    mode: &TimezoneMode,
    theme: Theme,
    style: Style,
    with_date: bool,
) -> Line<'static> {
    let dim = resolve(ThemeColor::Dim, theme);
    let venue = store.venue(&fixture.venue);
    let when = if with_date {
        format!(
            "  {} {}  ",
            format_match_date(fixture.kickoff(), mode, venue),
            format_match_time(fixture.kickoff(), mode, venue)
        )
    } else {
        format!("  {}  ", format_match_time(fixture.kickoff(), mode, venue))
    };
    let place = venue
        .map(|v| format!("  {}, {}", v.name, v.display_city))
        .unwrap_or_default();
    Line::from(vec![
        Span::styled(when, dim),
        Span::styled(format!("{:>4}  ", format!("#{}", fixture.match_number)), dim),
        Span::styled(
            format!("{} v {}", store.team_name(&fixture.home), store.team_name(&fixture.away)),
            style,
        ),
        Span::styled(place, dim),
    ])
}

// ---------------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------------

fn draw_venue(f: &mut Frame, area: Rect, app: &App, store: &FixtureStore) {
    let theme = app.state.prefs.theme;
    let venues = store.venues();
    if venues.is_empty() {
        draw_placeholder(f, area, theme, " Venues ", "No venues");
        return;
    }
    let selected = app.state.venue.selected.min(venues.len() - 1);

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Length(34), Constraint::Fill(1)]).areas(area);

    let block = default_border(theme).title(" Venues ");
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);
    let list: Vec<Line> = venues
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let style = if i == selected {
                resolve(ThemeColor::Selected, theme)
            } else {
                resolve(ThemeColor::Text, theme)
            };
            Line::styled(format!("{:<14} {}", v.display_city, v.country), style)
        })
        .collect();
    let scroll = (selected as u16).saturating_sub(inner.height.saturating_sub(1));
    f.render_widget(Paragraph::new(list).scroll((scroll, 0)), inner);

    let venue = &venues[selected];
    let block = default_border(theme).title(format!(" {} ", venue.name));
    let inner = block.inner(detail_area);
    f.render_widget(block, detail_area);

    let text = resolve(ThemeColor::Text, theme);
    let dim = resolve(ThemeColor::Dim, theme);
    let hosts = venue
        .hosts_rounds
        .iter()
        .map(|r| r.short_label())
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = vec![
        Line::styled(format!("{}, {}", venue.display_city, venue.country), text),
        Line::styled(format!("Capacity {}  ·  {}", venue.capacity, venue.timezone), dim),
        Line::styled(format!("Hosts: {hosts}"), dim),
        Line::default(),
    ];
    let mode = &app.state.prefs.timezone;
    let fixtures = store.venue_fixtures(&venue.id);
    if fixtures.is_empty() {
        lines.push(Line::styled("No fixtures scheduled here", dim));
    }
    let our_team = app.state.prefs.team.as_deref();
    for fixture in fixtures {
        let style = if our_team.is_some_and(|id| fixture.involves_team(id)) {
            resolve(ThemeColor::Ours, theme)
        } else {
            text
        };
        lines.push(fixture_line(store, fixture, mode, theme, style, true));
    }
    f.render_widget(Paragraph::new(lines).scroll((app.state.venue.scroll_offset, 0)), inner);
}

// ---------------------------------------------------------------------------
// Help, logs, status
// ---------------------------------------------------------------------------

const HELP_TEXT: &[(&str, &str)] = &[
    ("1-6", "switch tab"),
    ("?  /  Esc", "help / back"),
    ("j/k  ↑/↓", "move or scroll"),
    ("/", "search teams (Teams)"),
    ("Enter", "select team (Teams)"),
    ("h/l  ←/→", "path tab (Dashboard), round filter (Fixtures)"),
    ("n", "next third-place scenario (Dashboard)"),
    ("c", "export team fixtures as .ics (Dashboard)"),
    ("J/K", "scroll venue fixtures (Venues)"),
    ("t", "cycle timezone"),
    ("v", "toggle venue local time"),
    ("d", "toggle dark / light theme"),
    ("f", "full screen"),
    ("\"", "log pane"),
    ("r", "reload tournament data"),
    ("q", "quit"),
];

fn draw_help(f: &mut Frame, area: Rect, theme: Theme) {
    let block = default_border(theme).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let lines: Vec<Line> = HELP_TEXT
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>12}  "), resolve(ThemeColor::Accent, theme)),
                Span::styled(*action, resolve(ThemeColor::Text, theme)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect, theme: Theme) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(theme).title(" Logs "))
        .style_error(resolve(ThemeColor::Error, theme))
        .style_warn(resolve(ThemeColor::Secondary, theme))
        .style_info(resolve(ThemeColor::Text, theme))
        .style_debug(resolve(ThemeColor::Dim, theme));
    f.render_widget(widget, area);
}

/// Error or confirmation message on the bottom border of the main panel.
fn draw_status_line(f: &mut Frame, main: Rect, app: &App) {
    let theme = app.state.prefs.theme;
    let (text, style) = match (&app.state.last_error, &app.state.status) {
        (Some(err), _) if app.state.store.is_some() => (err.as_str(), resolve(ThemeColor::Error, theme)),
        (_, Some(status)) => (status.as_str(), resolve(ThemeColor::Primary, theme)),
        _ => return,
    };
    if main.height < 2 || main.width < 4 {
        return;
    }
    let area = Rect::new(main.x + 2, main.bottom() - 1, main.width - 4, 1);
    f.render_widget(
        Paragraph::new(format!(" {text} ")).style(style.add_modifier(Modifier::BOLD)),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => resolve(ThemeColor::Error, app.state.prefs.theme),
        _ => resolve(ThemeColor::Text, app.state.prefs.theme),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
