/// Wire types for the bundled tournament dataset.
/// Files: teams.json, venues.json, fixtures.json, groups.json, squads.json
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub flag_url: Option<String>,
    #[serde(default)]
    pub fifa_ranking: Option<u16>,
    #[serde(default)]
    pub confederation: String,
    #[serde(default)]
    pub qualified: bool,
    pub group: String,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawVenue {
    pub id: String,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub display_city: Option<String>,
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub capacity: u32,
    pub timezone: String,
    /// Round codes ("group", "r32", ...).
    #[serde(default)]
    pub hosts_rounds: Vec<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawFixture {
    pub match_number: u16,
    pub round: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub matchday: Option<u8>,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM", UTC
    #[serde(rename = "timeUTC")]
    pub time_utc: String,
    pub venue: String,
    /// Team id or slot code ("1A", "3ABCDF", "W73", "L101").
    pub home_team: String,
    pub away_team: String,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct RawPlayer {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub number: Option<u8>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub caps: Option<u16>,
    #[serde(default)]
    pub goals: Option<u16>,
}

/// Everything the store is built from, in file layout.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct RawDataset {
    pub teams: Vec<RawTeam>,
    pub venues: Vec<RawVenue>,
    pub fixtures: Vec<RawFixture>,
    /// Group letter → team ids, seed first.
    pub groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub squads: HashMap<String, Vec<RawPlayer>>,
}
