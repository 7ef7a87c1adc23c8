//! Synthetic 48-team dataset whose bracket pairs adjacent match numbers.

use crate::data::{RawDataset, RawFixture, RawTeam, RawVenue};

const GROUPS: [char; 12] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L'];

/// Round of 32 slots, matches 73..=88.
const R32: [(&str, &str); 16] = [
    ("1A", "2B"),
    ("1C", "3ABCD"),
    ("1B", "2A"),
    ("1D", "3EFGH"),
    ("1E", "2F"),
    ("1F", "3IJKL"),
    ("1G", "2H"),
    ("1H", "3ACEG"),
    ("1I", "2J"),
    ("1J", "3DFHJ"),
    ("1K", "2L"),
    ("1L", "3ACIK"),
    ("2C", "2D"),
    ("2E", "3DEJL"),
    ("2G", "2I"),
    ("2K", "3FGHI"),
];

pub fn fixture(n: u16, round: &str, home: &str, away: &str) -> RawFixture {
    RawFixture {
        match_number: n,
        round: round.into(),
        group: None,
        matchday: None,
        date: "2026-07-01".into(),
        time_utc: "19:00".into(),
        venue: if n % 2 == 0 { "east".into() } else { "west".into() },
        home_team: home.into(),
        away_team: away.into(),
    }
}

/// Knockout fixtures 73..=104 where match `73 + 2k` and `74 + 2k` feed the
/// same successor.
pub fn knockout() -> Vec<RawFixture> {
    let mut fixtures: Vec<RawFixture> = R32
        .iter()
        .zip(73u16..)
        .map(|((home, away), n)| fixture(n, "r32", home, away))
        .collect();

    let rounds = [("r16", 89u16, 73u16, 8u16), ("qf", 97, 89, 4), ("sf", 101, 97, 2)];
    for (round, first, feeders, count) in rounds {
        for k in 0..count {
            let home = format!("W{}", feeders + 2 * k);
            let away = format!("W{}", feeders + 2 * k + 1);
            fixtures.push(fixture(first + k, round, &home, &away));
        }
    }
    fixtures.push(fixture(103, "3rd", "L101", "L102"));
    fixtures.push(fixture(104, "final", "W101", "W102"));
    fixtures
}

/// Team `{g}{k}` is the k-th seed of group g. Group A's ranking order is
/// shuffled against its draw order and its fourth team is unranked.
pub fn dataset() -> RawDataset {
    let mut teams = Vec::new();
    let mut groups = std::collections::BTreeMap::new();
    for (gi, group) in GROUPS.iter().enumerate() {
        let mut ids = Vec::new();
        for k in 1..=4u16 {
            let id = format!("{}{k}", group.to_ascii_lowercase());
            let fifa_ranking = match (group, k) {
                ('A', 1) => Some(10),
                ('A', 2) => Some(3),
                ('A', 3) => Some(7),
                ('A', 4) => None,
                _ => Some(gi as u16 * 4 + k + 10),
            };
            teams.push(RawTeam {
                id: id.clone(),
                name: format!("Team {}{k}", group),
                short_name: Some(format!("{}{k}", group)),
                flag_url: None,
                fifa_ranking,
                confederation: "UEFA".into(),
                qualified: true,
                group: group.to_string(),
            });
            ids.push(id);
        }
        groups.insert(group.to_string(), ids);
    }

    let mut fixtures = vec![
        group_fixture(1, 1, "a1", "a2"),
        group_fixture(2, 1, "a3", "a4"),
        group_fixture(3, 2, "a1", "a3"),
        group_fixture(4, 2, "a4", "a2"),
        group_fixture(5, 3, "a4", "a1"),
        group_fixture(6, 3, "a2", "a3"),
    ];
    fixtures.extend(knockout());

    RawDataset {
        teams,
        venues: vec![
            venue("east", "East Stadium", "America/New_York"),
            venue("west", "West Stadium", "America/Los_Angeles"),
        ],
        fixtures,
        groups,
        squads: Default::default(),
    }
}

fn group_fixture(n: u16, matchday: u8, home: &str, away: &str) -> RawFixture {
    RawFixture {
        group: Some("A".into()),
        matchday: Some(matchday),
        date: format!("2026-06-{:02}", 10 + u16::from(matchday) * 5 + n % 2),
        ..fixture(n, "group", home, away)
    }
}

fn venue(id: &str, name: &str, timezone: &str) -> RawVenue {
    RawVenue {
        id: id.into(),
        name: name.into(),
        city: format!("{name} City"),
        display_city: None,
        country: "USA".into(),
        lat: 0.0,
        lng: 0.0,
        capacity: 60_000,
        timezone: timezone.into(),
        hosts_rounds: vec!["group".into(), "r32".into()],
    }
}
