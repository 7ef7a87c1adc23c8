pub mod calendar;
pub mod data;
pub mod integrity;
pub mod paths;
pub mod slot;
pub mod store;
pub mod timezone;
pub mod tracer;

#[cfg(test)]
mod testdata;

pub use paths::{KnockoutPathService, KnockoutPaths, PathStep, ThirdPlaceScenario};
pub use slot::{OpponentDescription, OpponentKind, SlotRef, SlotResolver};
pub use store::{FixtureStore, StoreError, StoreResult};
pub use tracer::{BracketSplit, BracketTracer, FeederNode, RoundBuckets};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Ranking used for teams without a FIFA ranking so they sort last.
pub const UNRANKED: u16 = 999;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the bundled JSON layout
// ---------------------------------------------------------------------------

/// Tournament stage. Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    #[default]
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "r32")]
    RoundOf32,
    #[serde(rename = "r16")]
    RoundOf16,
    #[serde(rename = "qf")]
    QuarterFinal,
    #[serde(rename = "sf")]
    SemiFinal,
    #[serde(rename = "3rd")]
    ThirdPlace,
    #[serde(rename = "final")]
    Final,
}

impl Round {
    pub const ALL: [Round; 7] = [
        Round::Group,
        Round::RoundOf32,
        Round::RoundOf16,
        Round::QuarterFinal,
        Round::SemiFinal,
        Round::ThirdPlace,
        Round::Final,
    ];

    /// Number of main-bracket rounds between the Round of 32 and the Final, inclusive.
    pub const KNOCKOUT_ROUNDS: usize = 5;

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Round::Group => "group",
            Round::RoundOf32 => "r32",
            Round::RoundOf16 => "r16",
            Round::QuarterFinal => "qf",
            Round::SemiFinal => "sf",
            Round::ThirdPlace => "3rd",
            Round::Final => "final",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Round::Group => "Group Stage",
            Round::RoundOf32 => "Round of 32",
            Round::RoundOf16 => "Round of 16",
            Round::QuarterFinal => "Quarter-final",
            Round::SemiFinal => "Semi-final",
            Round::ThirdPlace => "Third Place",
            Round::Final => "Final",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            Round::Group => "GRP",
            Round::RoundOf32 => "R32",
            Round::RoundOf16 => "R16",
            Round::QuarterFinal => "QF",
            Round::SemiFinal => "SF",
            Round::ThirdPlace => "3RD",
            Round::Final => "FINAL",
        }
    }

    pub fn is_knockout(&self) -> bool {
        !matches!(self, Round::Group)
    }

    /// Column index in the main bracket: R32 = 0 through Final = 4.
    /// The third-place playoff hangs off the bracket and has no column.
    pub fn depth(&self) -> Option<usize> {
        match self {
            Round::RoundOf32 => Some(0),
            Round::RoundOf16 => Some(1),
            Round::QuarterFinal => Some(2),
            Round::SemiFinal => Some(3),
            Round::Final => Some(4),
            Round::Group | Round::ThirdPlace => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            Round::Group => None,
            Round::RoundOf32 => Some(Round::Group),
            Round::RoundOf16 => Some(Round::RoundOf32),
            Round::QuarterFinal => Some(Round::RoundOf16),
            Round::SemiFinal => Some(Round::QuarterFinal),
            Round::ThirdPlace | Round::Final => Some(Round::SemiFinal),
        }
    }

    /// Next round along the main bracket; the third-place playoff leads nowhere.
    pub fn next(self) -> Option<Self> {
        match self {
            Round::Group => Some(Round::RoundOf32),
            Round::RoundOf32 => Some(Round::RoundOf16),
            Round::RoundOf16 => Some(Round::QuarterFinal),
            Round::QuarterFinal => Some(Round::SemiFinal),
            Round::SemiFinal => Some(Round::Final),
            Round::ThirdPlace | Round::Final => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,             // "South Korea"
    pub short_name: String,       // "Korea"
    pub flag_url: Option<String>, // None for unresolved play-off placeholders
    pub fifa_ranking: Option<u16>,
    pub confederation: String,
    pub qualified: bool,
    pub group: char,
}

impl Team {
    /// Sort key for the FIFA-ranking heuristics; unranked teams go last.
    pub fn ranking_key(&self) -> u16 {
        self.fifa_ranking.unwrap_or(UNRANKED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub city: String,
    pub display_city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub capacity: u32,
    pub timezone: String, // IANA name, e.g. "America/Mexico_City"
    pub hosts_rounds: Vec<Round>,
}

/// Which half of a fixture a slot sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub match_number: u16,
    pub round: Round,
    pub group: Option<char>,
    pub matchday: Option<u8>,
    pub date: NaiveDate,
    pub time_utc: NaiveTime,
    pub venue: String,
    pub home: SlotRef,
    pub away: SlotRef,
}

impl Fixture {
    pub fn kickoff(&self) -> DateTime<Utc> {
        self.date.and_time(self.time_utc).and_utc()
    }

    pub fn slot(&self, side: Side) -> &SlotRef {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Side holding exactly this slot, home checked first.
    pub fn side_of(&self, slot: &SlotRef) -> Option<Side> {
        if &self.home == slot {
            Some(Side::Home)
        } else if &self.away == slot {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Match numbers this fixture's winner slots point back to, home first.
    pub fn winner_feeders(&self) -> impl Iterator<Item = u16> + '_ {
        [&self.home, &self.away]
            .into_iter()
            .filter_map(|s| s.winner_of())
    }

    pub fn involves_team(&self, team_id: &str) -> bool {
        self.home.team_id() == Some(team_id) || self.away.team_id() == Some(team_id)
    }
}

// ---------------------------------------------------------------------------
// Squads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    #[default]
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Unknown codes are filed with the midfielders.
    pub fn from_code(code: &str) -> Self {
        match code {
            "GK" => Position::Goalkeeper,
            "DEF" => Position::Defender,
            "FWD" => Position::Forward,
            _ => Position::Midfielder,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeepers",
            Position::Defender => "Defenders",
            Position::Midfielder => "Midfielders",
            Position::Forward => "Forwards",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub position: Position,
    pub number: Option<u8>,
    pub club: Option<String>,
    pub age: Option<u8>,
    pub caps: Option<u16>,
    pub goals: Option<u16>,
}
