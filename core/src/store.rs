use crate::data::{RawDataset, RawFixture, RawPlayer, RawTeam, RawVenue};
use crate::slot::SlotRef;
use crate::{Fixture, Player, Position, Round, Team, Venue};
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::{env, fmt, fs, io};

pub type StoreResult<T> = Result<T, StoreError>;

/// Directory holding an alternative dataset in the bundled file layout.
pub const DATA_DIR_ENV: &str = "WC26_DATA_DIR";

const TEAMS_JSON: &str = include_str!("../data/teams.json");
const VENUES_JSON: &str = include_str!("../data/venues.json");
const FIXTURES_JSON: &str = include_str!("../data/fixtures.json");
const GROUPS_JSON: &str = include_str!("../data/groups.json");
const SQUADS_JSON: &str = include_str!("../data/squads.json");

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error, String),
    Parsing(serde_json::Error, String),
    Invalid(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e, path) => write!(f, "Could not read {path}: {e}"),
            StoreError::Parsing(e, source) => write!(f, "Parse error in {source}: {e}"),
            StoreError::Invalid(msg) => write!(f, "Invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Immutable in-memory tables of teams, venues, groups, fixtures and squads.
///
/// Built once at startup; every lookup borrows from it. Fixture slots are
/// classified into [`SlotRef`]s while loading, so nothing downstream has to
/// pattern-match raw strings again.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    teams: Vec<Team>,
    team_index: HashMap<String, usize>,
    venues: Vec<Venue>,
    venue_index: HashMap<String, usize>,
    fixtures: BTreeMap<u16, Fixture>,
    groups: BTreeMap<char, Vec<String>>,
    squads: HashMap<String, Vec<Player>>,
}

impl FixtureStore {
    /// Load the tournament data.
    ///
    /// `WC26_DATA_DIR` points at a directory with the same five JSON files as
    /// the embedded dataset; otherwise the embedded dataset is used.
    pub fn load() -> StoreResult<Self> {
        if let Ok(dir) = env::var(DATA_DIR_ENV)
            && !dir.trim().is_empty()
        {
            debug!("loading tournament data from {dir}");
            return Self::from_dir(dir.trim());
        }
        Self::embedded()
    }

    pub fn embedded() -> StoreResult<Self> {
        let raw = RawDataset {
            teams: parse_json(TEAMS_JSON, "embedded teams.json")?,
            venues: parse_json(VENUES_JSON, "embedded venues.json")?,
            fixtures: parse_json(FIXTURES_JSON, "embedded fixtures.json")?,
            groups: parse_json(GROUPS_JSON, "embedded groups.json")?,
            squads: parse_json(SQUADS_JSON, "embedded squads.json")?,
        };
        Self::from_raw(raw)
    }

    /// Load from a directory. `squads.json` is optional.
    pub fn from_dir(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| -> StoreResult<String> {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|e| StoreError::Io(e, path.display().to_string()))
        };

        let squads = match read("squads.json") {
            Ok(content) => parse_json(&content, "squads.json")?,
            Err(StoreError::Io(e, _)) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };

        let raw = RawDataset {
            teams: parse_json(&read("teams.json")?, "teams.json")?,
            venues: parse_json(&read("venues.json")?, "venues.json")?,
            fixtures: parse_json(&read("fixtures.json")?, "fixtures.json")?,
            groups: parse_json(&read("groups.json")?, "groups.json")?,
            squads,
        };
        Self::from_raw(raw)
    }

    /// Build the store from raw records, validating ids, dates, times and
    /// round codes. Bracket linkage is not checked here; see
    /// [`crate::integrity::check_bracket`].
    pub fn from_raw(raw: RawDataset) -> StoreResult<Self> {
        let mut store = FixtureStore::default();

        for t in raw.teams {
            let team = map_team(t)?;
            if store
                .team_index
                .insert(team.id.clone(), store.teams.len())
                .is_some()
            {
                return Err(StoreError::Invalid(format!("duplicate team id {}", team.id)));
            }
            store.teams.push(team);
        }

        for v in raw.venues {
            let venue = map_venue(v)?;
            if store
                .venue_index
                .insert(venue.id.clone(), store.venues.len())
                .is_some()
            {
                return Err(StoreError::Invalid(format!("duplicate venue id {}", venue.id)));
            }
            store.venues.push(venue);
        }

        for (letter, ids) in raw.groups {
            store.groups.insert(parse_group(&letter)?, ids);
        }

        for f in raw.fixtures {
            let fixture = store.map_fixture(f)?;
            let n = fixture.match_number;
            if store.fixtures.insert(n, fixture).is_some() {
                return Err(StoreError::Invalid(format!("duplicate match number {n}")));
            }
        }

        for (team_id, players) in raw.squads {
            store
                .squads
                .insert(team_id, players.into_iter().map(map_player).collect());
        }

        debug!(
            "tournament data: {} teams, {} venues, {} fixtures",
            store.teams.len(),
            store.venues.len(),
            store.fixtures.len()
        );
        Ok(store)
    }

    // -----------------------------------------------------------------------
    // Teams and groups
    // -----------------------------------------------------------------------

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.team_index.get(id).map(|&i| &self.teams[i])
    }

    /// All teams, in dataset order.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Case-insensitive match on name or short name. An empty query matches everything.
    pub fn search_teams(&self, query: &str) -> Vec<&Team> {
        let query = query.trim().to_lowercase();
        self.teams
            .iter()
            .filter(|t| {
                query.is_empty()
                    || t.name.to_lowercase().contains(&query)
                    || t.short_name.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = char> + '_ {
        self.groups.keys().copied()
    }

    pub fn has_group(&self, group: char) -> bool {
        self.groups.contains_key(&group)
    }

    /// Team ids of a group, seed first. Empty for an unknown group.
    pub fn group_team_ids(&self, group: char) -> &[String] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Teams of a group in draw order; ids with no team record are skipped.
    pub fn group_teams(&self, group: char) -> Vec<&Team> {
        self.group_team_ids(group)
            .iter()
            .filter_map(|id| self.team(id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Venues
    // -----------------------------------------------------------------------

    pub fn venue(&self, id: &str) -> Option<&Venue> {
        self.venue_index.get(id).map(|&i| &self.venues[i])
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    // -----------------------------------------------------------------------
    // Fixtures
    // -----------------------------------------------------------------------

    pub fn fixture(&self, match_number: u16) -> Option<&Fixture> {
        self.fixtures.get(&match_number)
    }

    /// All fixtures by ascending match number.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> + '_ {
        self.fixtures.values()
    }

    pub fn team_fixtures(&self, team_id: &str) -> Vec<&Fixture> {
        self.fixtures().filter(|f| f.involves_team(team_id)).collect()
    }

    pub fn group_fixtures(&self, group: char) -> Vec<&Fixture> {
        self.fixtures().filter(|f| f.group == Some(group)).collect()
    }

    pub fn venue_fixtures(&self, venue_id: &str) -> Vec<&Fixture> {
        self.fixtures().filter(|f| f.venue == venue_id).collect()
    }

    /// Fixtures of one round, ascending by match number.
    pub fn fixtures_in_round(&self, round: Round) -> Vec<&Fixture> {
        self.fixtures().filter(|f| f.round == round).collect()
    }

    pub fn knockout_fixtures(&self) -> Vec<&Fixture> {
        self.fixtures().filter(|f| f.round.is_knockout()).collect()
    }

    /// The Final, if exactly one exists.
    pub fn final_fixture(&self) -> Option<&Fixture> {
        single(self.fixtures_in_round(Round::Final))
    }

    pub fn third_place_fixture(&self) -> Option<&Fixture> {
        single(self.fixtures_in_round(Round::ThirdPlace))
    }

    /// Group fixtures by calendar date, dates ascending.
    pub fn fixtures_by_date<'a>(
        fixtures: impl IntoIterator<Item = &'a Fixture>,
    ) -> Vec<(NaiveDate, Vec<&'a Fixture>)> {
        let mut grouped: BTreeMap<NaiveDate, Vec<&Fixture>> = BTreeMap::new();
        for f in fixtures {
            grouped.entry(f.date).or_default().push(f);
        }
        grouped.into_iter().collect()
    }

    // -----------------------------------------------------------------------
    // Squads
    // -----------------------------------------------------------------------

    /// Roster for a team; empty until the squad is announced.
    pub fn squad(&self, team_id: &str) -> &[Player] {
        self.squads
            .get(team_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Roster split by position in GK, DEF, MID, FWD order, skipping empty lines.
    pub fn squad_by_position(&self, team_id: &str) -> Vec<(Position, Vec<&Player>)> {
        Position::ALL
            .into_iter()
            .map(|pos| {
                let players = self
                    .squad(team_id)
                    .iter()
                    .filter(|p| p.position == pos)
                    .collect::<Vec<_>>();
                (pos, players)
            })
            .filter(|(_, players)| !players.is_empty())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Display names
    // -----------------------------------------------------------------------

    /// Short display name for any slot: the team name when known, otherwise
    /// a readable placeholder such as "Winner Group A" or "Loser Match 101".
    pub fn team_name(&self, slot: &SlotRef) -> String {
        match slot {
            SlotRef::Team(id) => self
                .team(id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| id.clone()),
            SlotRef::GroupPosition { position: 1, group } => format!("Winner Group {group}"),
            SlotRef::GroupPosition { position: 2, group } => format!("Runner-up Group {group}"),
            SlotRef::GroupPosition { group, .. } => format!("3rd Group {group}"),
            SlotRef::ThirdPlacePool(groups) => {
                format!("Best 3rd ({})", groups.iter().collect::<String>())
            }
            SlotRef::Winner(n) => format!("Winner Match {n}"),
            SlotRef::Loser(n) => format!("Loser Match {n}"),
            SlotRef::Literal(text) => text.clone(),
        }
    }

    pub fn flag_url(&self, slot: &SlotRef) -> Option<&str> {
        slot.team_id()
            .and_then(|id| self.team(id))
            .and_then(|t| t.flag_url.as_deref())
    }

    fn map_fixture(&self, f: RawFixture) -> StoreResult<Fixture> {
        let n = f.match_number;
        let round = Round::from_code(&f.round)
            .ok_or_else(|| StoreError::Invalid(format!("match {n}: unknown round {:?}", f.round)))?;
        let date = NaiveDate::parse_from_str(&f.date, "%Y-%m-%d")
            .map_err(|e| StoreError::Invalid(format!("match {n}: bad date {:?}: {e}", f.date)))?;
        let time_utc = NaiveTime::parse_from_str(&f.time_utc, "%H:%M").map_err(|e| {
            StoreError::Invalid(format!("match {n}: bad kickoff time {:?}: {e}", f.time_utc))
        })?;
        let group = f.group.as_deref().map(parse_group).transpose()?;
        let is_team = |id: &str| self.team_index.contains_key(id);

        Ok(Fixture {
            match_number: n,
            round,
            group,
            matchday: f.matchday,
            date,
            time_utc,
            venue: f.venue,
            home: SlotRef::parse(&f.home_team, is_team),
            away: SlotRef::parse(&f.away_team, is_team),
        })
    }
}

fn parse_json<T: DeserializeOwned>(content: &str, source: &str) -> StoreResult<T> {
    serde_json::from_str(content).map_err(|e| StoreError::Parsing(e, source.to_owned()))
}

fn parse_group(letter: &str) -> StoreResult<char> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Ok(c),
        _ => Err(StoreError::Invalid(format!("bad group letter {letter:?}"))),
    }
}

fn single(mut fixtures: Vec<&Fixture>) -> Option<&Fixture> {
    if fixtures.len() == 1 { fixtures.pop() } else { None }
}

fn map_team(t: RawTeam) -> StoreResult<Team> {
    let group = parse_group(&t.group)?;
    Ok(Team {
        short_name: t.short_name.unwrap_or_else(|| t.name.clone()),
        id: t.id,
        name: t.name,
        flag_url: t.flag_url.filter(|u| !u.is_empty()),
        fifa_ranking: t.fifa_ranking,
        confederation: t.confederation,
        qualified: t.qualified,
        group,
    })
}

fn map_venue(v: RawVenue) -> StoreResult<Venue> {
    let hosts_rounds = v
        .hosts_rounds
        .iter()
        .map(|code| {
            Round::from_code(code).ok_or_else(|| {
                StoreError::Invalid(format!("venue {}: unknown round {code:?}", v.id))
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(Venue {
        display_city: v.display_city.unwrap_or_else(|| v.city.clone()),
        id: v.id,
        name: v.name,
        city: v.city,
        country: v.country,
        lat: v.lat,
        lng: v.lng,
        capacity: v.capacity,
        timezone: v.timezone,
        hosts_rounds,
    })
}

fn map_player(p: RawPlayer) -> Player {
    Player {
        position: Position::from_code(&p.position),
        name: p.name,
        number: p.number,
        club: p.club.filter(|c| !c.is_empty()),
        age: p.age,
        caps: p.caps,
        goals: p.goals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn embedded_dataset_loads() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        assert_eq!(store.teams().len(), 48);
        assert_eq!(store.venues().len(), 16);
        assert_eq!(store.fixtures().count(), 104);
        assert_eq!(store.groups().count(), 12);
        for group in store.groups() {
            assert_eq!(store.group_teams(group).len(), 4, "group {group}");
        }
    }

    #[test]
    fn embedded_dataset_round_sizes() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let count = |r| store.fixtures_in_round(r).len();
        assert_eq!(count(Round::Group), 72);
        assert_eq!(count(Round::RoundOf32), 16);
        assert_eq!(count(Round::RoundOf16), 8);
        assert_eq!(count(Round::QuarterFinal), 4);
        assert_eq!(count(Round::SemiFinal), 2);
        assert!(store.third_place_fixture().is_some());
        assert_eq!(store.final_fixture().map(|f| f.match_number), Some(104));
    }

    #[test]
    fn opening_match_is_mexico_at_azteca() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let opener = store.fixture(1).expect("match 1");
        assert_eq!(opener.home, SlotRef::Team("mex".into()));
        assert_eq!(opener.venue, "mexico-city");
    }

    #[test]
    fn slots_are_classified_at_load() {
        let store = FixtureStore::from_raw(testdata::dataset()).expect("test data");
        let r32 = store.fixture(73).expect("match 73");
        assert_eq!(r32.home, SlotRef::GroupPosition { position: 1, group: 'A' });
        assert_eq!(store.fixture(74).map(|f| &f.away), Some(&SlotRef::ThirdPlacePool(vec!['A', 'B', 'C', 'D'])));
        assert_eq!(store.fixture(1).map(|f| &f.home), Some(&SlotRef::Team("a1".into())));
        assert_eq!(store.fixture(103).map(|f| &f.home), Some(&SlotRef::Loser(101)));
    }

    #[test]
    fn duplicate_match_number_is_rejected() {
        let mut raw = testdata::dataset();
        let dup = raw.fixtures[0].clone();
        raw.fixtures.push(dup);
        match FixtureStore::from_raw(raw) {
            Err(StoreError::Invalid(msg)) => assert!(msg.contains("duplicate match number")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn bad_kickoff_time_is_rejected() {
        let mut raw = testdata::dataset();
        raw.fixtures[0].time_utc = "7pm".into();
        assert!(matches!(FixtureStore::from_raw(raw), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn unknown_round_code_is_rejected() {
        let mut raw = testdata::dataset();
        raw.fixtures[0].round = "semis".into();
        assert!(matches!(FixtureStore::from_raw(raw), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn missing_lookups_resolve_to_none_or_empty() {
        let store = FixtureStore::from_raw(testdata::dataset()).expect("test data");
        assert!(store.team("nobody").is_none());
        assert!(store.venue("atlantis").is_none());
        assert!(store.fixture(999).is_none());
        assert!(store.group_teams('Z').is_empty());
        assert!(store.squad("a1").is_empty());
    }

    #[test]
    fn search_matches_name_and_short_name() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let names = |q: &str| {
            store
                .search_teams(q)
                .into_iter()
                .map(|t| t.id.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(names("ARGEN"), vec!["arg"]);
        assert_eq!(names("korea"), vec!["kor"]);
        assert!(names("zzz").is_empty());
        assert_eq!(store.search_teams("  ").len(), 48);
    }

    #[test]
    fn fixtures_by_date_sorts_dates() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let days = FixtureStore::fixtures_by_date(store.fixtures_in_round(Round::RoundOf16));
        let dates: Vec<_> = days.iter().map(|(d, _)| *d).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(days.iter().map(|(_, f)| f.len()).sum::<usize>(), 8);
    }

    #[test]
    fn team_fixtures_cover_group_stage() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let fixtures = store.team_fixtures("bra");
        assert_eq!(fixtures.len(), 3);
        assert!(fixtures.iter().all(|f| f.group == Some('C')));
    }

    #[test]
    fn team_name_labels_placeholders() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        assert_eq!(store.team_name(&SlotRef::Team("fra".into())), "France");
        assert_eq!(store.team_name(&SlotRef::GroupPosition { position: 1, group: 'A' }), "Winner Group A");
        assert_eq!(store.team_name(&SlotRef::GroupPosition { position: 2, group: 'B' }), "Runner-up Group B");
        assert_eq!(store.team_name(&SlotRef::GroupPosition { position: 3, group: 'C' }), "3rd Group C");
        assert_eq!(store.team_name(&SlotRef::Winner(73)), "Winner Match 73");
        assert_eq!(store.team_name(&SlotRef::Loser(101)), "Loser Match 101");
        assert_eq!(
            store.team_name(&SlotRef::ThirdPlacePool(vec!['A', 'B', 'C', 'D', 'F'])),
            "Best 3rd (ABCDF)"
        );
    }

    #[test]
    fn squad_groups_by_position_and_skips_empty_lines() {
        let mut raw = testdata::dataset();
        let player = |name: &str, position: &str| RawPlayer {
            name: name.into(),
            position: position.into(),
            ..Default::default()
        };
        raw.squads.insert(
            "a1".into(),
            vec![player("Keeper", "GK"), player("Winger", "WB"), player("Striker", "FWD")],
        );
        let store = FixtureStore::from_raw(raw).expect("test data");
        let lines = store.squad_by_position("a1");
        let positions: Vec<_> = lines.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            positions,
            vec![Position::Goalkeeper, Position::Midfielder, Position::Forward]
        );
        assert_eq!(lines[1].1[0].name, "Winger");
    }
}
