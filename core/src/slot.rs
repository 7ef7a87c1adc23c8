use crate::store::FixtureStore;
use crate::Team;
use serde::Serialize;
use std::fmt;

const GROUP_LETTERS: std::ops::RangeInclusive<char> = 'A'..='L';

/// What occupies the home or away side of a fixture.
///
/// Group-stage fixtures name teams directly; knockout fixtures name the rule
/// that will produce the participant. Serialized back to its code
/// ("1A", "3ABCDF", "W73", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum SlotRef {
    /// A known team id.
    Team(String),
    /// Nth-placed team of a group; position is 1..=3.
    GroupPosition { position: u8, group: char },
    /// Best third-placed team among the listed groups.
    ThirdPlacePool(Vec<char>),
    /// Winner of an earlier match.
    Winner(u16),
    /// Loser of an earlier match (third-place playoff only).
    Loser(u16),
    /// Anything unrecognised, shown as-is.
    Literal(String),
}

impl SlotRef {
    /// Classify a raw slot string. Slot-code patterns take precedence, then
    /// known team ids; anything else is kept as a literal label.
    pub fn parse(code: &str, is_team: impl Fn(&str) -> bool) -> Self {
        let bytes = code.as_bytes();
        let is_group = |c: char| GROUP_LETTERS.contains(&c);

        if bytes.len() == 2 && (b'1'..=b'3').contains(&bytes[0]) && is_group(bytes[1] as char) {
            return SlotRef::GroupPosition {
                position: bytes[0] - b'0',
                group: bytes[1] as char,
            };
        }

        if bytes.len() >= 3 && bytes[0] == b'3' && code[1..].chars().all(is_group) {
            return SlotRef::ThirdPlacePool(code[1..].chars().collect());
        }

        if let Some(n) = parse_match_ref(code, 'W') {
            return SlotRef::Winner(n);
        }

        if let Some(n) = parse_match_ref(code, 'L') {
            return SlotRef::Loser(n);
        }

        if is_team(code) {
            SlotRef::Team(code.to_owned())
        } else {
            SlotRef::Literal(code.to_owned())
        }
    }

    pub fn winner_of(&self) -> Option<u16> {
        match self {
            SlotRef::Winner(n) => Some(*n),
            _ => None,
        }
    }

    pub fn loser_of(&self) -> Option<u16> {
        match self {
            SlotRef::Loser(n) => Some(*n),
            _ => None,
        }
    }

    pub fn team_id(&self) -> Option<&str> {
        match self {
            SlotRef::Team(id) => Some(id),
            _ => None,
        }
    }

    /// Slots that seed the Round of 32 from the group stage.
    pub fn is_entry_code(&self) -> bool {
        matches!(
            self,
            SlotRef::GroupPosition { .. } | SlotRef::ThirdPlacePool(_)
        )
    }

    /// True for a third-place pool that draws on `group`.
    pub fn pool_includes(&self, group: char) -> bool {
        matches!(self, SlotRef::ThirdPlacePool(groups) if groups.contains(&group))
    }
}

fn parse_match_ref(code: &str, prefix: char) -> Option<u16> {
    let digits = code.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRef::Team(id) => f.write_str(id),
            SlotRef::GroupPosition { position, group } => write!(f, "{position}{group}"),
            SlotRef::ThirdPlacePool(groups) => {
                write!(f, "3{}", groups.iter().collect::<String>())
            }
            SlotRef::Winner(n) => write!(f, "W{n}"),
            SlotRef::Loser(n) => write!(f, "L{n}"),
            SlotRef::Literal(text) => f.write_str(text),
        }
    }
}

impl From<SlotRef> for String {
    fn from(slot: SlotRef) -> Self {
        slot.to_string()
    }
}

// ---------------------------------------------------------------------------
// Opponent descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpponentKind {
    Team,
    GroupWinner,
    GroupRunnerUp,
    GroupThird,
    ThirdPlacePool,
    MatchWinner,
    MatchLoser,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentDescription {
    pub label: String,
    pub kind: OpponentKind,
    /// Likely occupants by FIFA ranking, best first. Only for group-position
    /// and third-place-pool slots.
    pub candidates: Vec<Team>,
    pub match_number: Option<u16>,
}

impl OpponentDescription {
    fn new(label: String, kind: OpponentKind) -> Self {
        Self {
            label,
            kind,
            candidates: Vec::new(),
            match_number: None,
        }
    }

    fn unknown(slot: &SlotRef) -> Self {
        Self::new(slot.to_string(), OpponentKind::Unknown)
    }
}

/// Turns slot references into labels and candidate lists.
#[derive(Debug, Clone, Copy)]
pub struct SlotResolver<'a> {
    store: &'a FixtureStore,
}

impl<'a> SlotResolver<'a> {
    pub fn new(store: &'a FixtureStore) -> Self {
        Self { store }
    }

    pub fn classify(&self, code: &str) -> SlotRef {
        SlotRef::parse(code, |id| self.store.team(id).is_some())
    }

    /// Describe `slot` as an opponent. `None` only when `slot` is `exclude`,
    /// i.e. the team would be described as its own opponent.
    pub fn describe(&self, slot: &SlotRef, exclude: Option<&SlotRef>) -> Option<OpponentDescription> {
        if exclude == Some(slot) {
            return None;
        }

        let description = match slot {
            SlotRef::Team(id) => match self.store.team(id) {
                Some(team) => OpponentDescription::new(team.name.clone(), OpponentKind::Team),
                None => OpponentDescription::unknown(slot),
            },
            SlotRef::GroupPosition { position, group } if self.store.has_group(*group) => {
                let (label, kind) = match position {
                    1 => (format!("Winner of Group {group}"), OpponentKind::GroupWinner),
                    2 => (format!("Runner-up of Group {group}"), OpponentKind::GroupRunnerUp),
                    _ => (format!("3rd place of Group {group}"), OpponentKind::GroupThird),
                };
                OpponentDescription {
                    candidates: self.candidates(slot),
                    ..OpponentDescription::new(label, kind)
                }
            }
            SlotRef::ThirdPlacePool(groups) if groups.iter().all(|g| self.store.has_group(*g)) => {
                let listed = groups
                    .iter()
                    .map(|g| format!("Group {g}"))
                    .collect::<Vec<_>>()
                    .join(" / ");
                OpponentDescription {
                    candidates: self.candidates(slot),
                    ..OpponentDescription::new(
                        format!("Best 3rd-place from {listed}"),
                        OpponentKind::ThirdPlacePool,
                    )
                }
            }
            SlotRef::Winner(n) => match self.store.fixture(*n) {
                Some(fixture) => OpponentDescription {
                    match_number: Some(*n),
                    ..OpponentDescription::new(
                        format!(
                            "Winner of {} vs {}",
                            self.store.team_name(&fixture.home),
                            self.store.team_name(&fixture.away)
                        ),
                        OpponentKind::MatchWinner,
                    )
                },
                None => OpponentDescription::unknown(slot),
            },
            SlotRef::Loser(n) if self.store.fixture(*n).is_some() => OpponentDescription {
                match_number: Some(*n),
                ..OpponentDescription::new(format!("Loser of Match {n}"), OpponentKind::MatchLoser)
            },
            _ => OpponentDescription::unknown(slot),
        };
        Some(description)
    }

    /// Full label for a slot, e.g. "Runner-up of Group B".
    pub fn label(&self, slot: &SlotRef) -> String {
        self.describe(slot, None)
            .map(|d| d.label)
            .unwrap_or_else(|| slot.to_string())
    }

    /// Compact label, e.g. "Runner-up Group B".
    pub fn short_label(&self, slot: &SlotRef) -> String {
        self.store.team_name(slot)
    }

    /// FIFA-ranking guess at who fills a group-position or pool slot.
    ///
    /// A group's teams are sorted by ranking (unranked last). Winners take the
    /// top two, runners-up the second and third, deliberately overlapping.
    /// A pool takes the third-ranked team of each listed group and re-sorts.
    pub fn candidates(&self, slot: &SlotRef) -> Vec<Team> {
        match slot {
            SlotRef::GroupPosition { position, group } => {
                let ranked = self.ranked_group(*group);
                let (skip, take) = match position {
                    1 => (0, 2),
                    2 => (1, 2),
                    _ => (2, usize::MAX),
                };
                ranked.into_iter().skip(skip).take(take).cloned().collect()
            }
            SlotRef::ThirdPlacePool(groups) => {
                let mut thirds: Vec<&Team> = groups
                    .iter()
                    .filter_map(|g| self.ranked_group(*g).get(2).copied())
                    .collect();
                thirds.sort_by_key(|t| t.ranking_key());
                thirds.into_iter().cloned().collect()
            }
            _ => Vec::new(),
        }
    }

    fn ranked_group(&self, group: char) -> Vec<&'a Team> {
        let mut teams = self.store.group_teams(group);
        teams.sort_by_key(|t| t.ranking_key());
        teams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use pretty_assertions::assert_eq;

    fn store() -> FixtureStore {
        FixtureStore::from_raw(testdata::dataset()).expect("test data")
    }

    fn ids(teams: &[Team]) -> Vec<&str> {
        teams.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn parse_recognises_each_kind() {
        let is_team = |id: &str| id == "fra";
        assert_eq!(SlotRef::parse("1A", is_team), SlotRef::GroupPosition { position: 1, group: 'A' });
        assert_eq!(SlotRef::parse("3C", is_team), SlotRef::GroupPosition { position: 3, group: 'C' });
        assert_eq!(SlotRef::parse("3ABCDF", is_team), SlotRef::ThirdPlacePool(vec!['A', 'B', 'C', 'D', 'F']));
        assert_eq!(SlotRef::parse("W73", is_team), SlotRef::Winner(73));
        assert_eq!(SlotRef::parse("L101", is_team), SlotRef::Loser(101));
        assert_eq!(SlotRef::parse("fra", is_team), SlotRef::Team("fra".into()));
        assert_eq!(SlotRef::parse("TBD", is_team), SlotRef::Literal("TBD".into()));
    }

    #[test]
    fn parse_rejects_near_misses() {
        let no_team = |_: &str| false;
        assert_eq!(SlotRef::parse("4A", no_team), SlotRef::Literal("4A".into()));
        assert_eq!(SlotRef::parse("1M", no_team), SlotRef::Literal("1M".into()));
        assert_eq!(SlotRef::parse("W", no_team), SlotRef::Literal("W".into()));
        assert_eq!(SlotRef::parse("W7a", no_team), SlotRef::Literal("W7a".into()));
        assert_eq!(SlotRef::parse("3AbC", no_team), SlotRef::Literal("3AbC".into()));
    }

    #[test]
    fn display_restores_the_code() {
        for code in ["1A", "2L", "3ABCDF", "W73", "L102"] {
            assert_eq!(SlotRef::parse(code, |_| false).to_string(), code);
        }
    }

    #[test]
    fn first_place_candidates_are_the_two_best_ranked() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        let slot = resolver.classify("1A");
        // Group A rankings: a1=10, a2=3, a3=7, a4 unranked.
        assert_eq!(ids(&resolver.candidates(&slot)), vec!["a2", "a3"]);
    }

    #[test]
    fn runner_up_window_overlaps_winner_window() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        assert_eq!(ids(&resolver.candidates(&resolver.classify("2A"))), vec!["a3", "a1"]);
        assert_eq!(ids(&resolver.candidates(&resolver.classify("3A"))), vec!["a1", "a4"]);
    }

    #[test]
    fn pool_candidates_take_each_groups_third_and_resort() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        let pool = resolver.classify("3BA");
        // Third of A by ranking is a1 (10); third of B is b3 (17).
        assert_eq!(ids(&resolver.candidates(&pool)), vec!["a1", "b3"]);
    }

    #[test]
    fn missing_group_gives_no_candidates() {
        let store = FixtureStore::default();
        let resolver = SlotResolver::new(&store);
        let slot = SlotRef::GroupPosition { position: 1, group: 'A' };
        assert!(resolver.candidates(&slot).is_empty());
        assert!(resolver.candidates(&SlotRef::ThirdPlacePool(vec!['A', 'B'])).is_empty());
    }

    #[test]
    fn describe_is_none_only_for_the_excluded_slot() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        let slots = ["1A", "2B", "3ABCD", "W73", "L101", "a1", "TBD"].map(|c| resolver.classify(c));
        for slot in &slots {
            for exclude in &slots {
                let described = resolver.describe(slot, Some(exclude));
                assert_eq!(described.is_none(), slot == exclude, "{slot} excluding {exclude}");
            }
            assert!(resolver.describe(slot, None).is_some());
        }
    }

    #[test]
    fn describe_labels() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        let label = |code: &str| resolver.label(&resolver.classify(code));
        assert_eq!(label("1A"), "Winner of Group A");
        assert_eq!(label("2B"), "Runner-up of Group B");
        assert_eq!(label("3ACD"), "Best 3rd-place from Group A / Group C / Group D");
        assert_eq!(label("W73"), "Winner of Winner Group A vs Runner-up Group B");
        assert_eq!(label("W89"), "Winner of Winner Match 73 vs Winner Match 74");
        assert_eq!(label("L101"), "Loser of Match 101");
        assert_eq!(label("a1"), "Team A1");
    }

    #[test]
    fn describe_falls_back_to_literal_for_missing_targets() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        for slot in [
            SlotRef::GroupPosition { position: 1, group: 'M' },
            SlotRef::ThirdPlacePool(vec!['A', 'Z']),
            SlotRef::Winner(999),
            SlotRef::Loser(999),
            SlotRef::Literal("TBD".into()),
        ] {
            let description = resolver.describe(&slot, None).expect("not excluded");
            assert_eq!(description.kind, OpponentKind::Unknown);
            assert_eq!(description.label, slot.to_string());
            assert!(description.candidates.is_empty());
        }
    }

    #[test]
    fn winner_description_carries_match_number() {
        let store = store();
        let resolver = SlotResolver::new(&store);
        let description = resolver.describe(&SlotRef::Winner(73), None).expect("described");
        assert_eq!(description.kind, OpponentKind::MatchWinner);
        assert_eq!(description.match_number, Some(73));
    }

    #[test]
    fn slot_serializes_as_its_code() {
        let json = serde_json::to_string(&SlotRef::ThirdPlacePool(vec!['E', 'F'])).expect("serialize");
        assert_eq!(json, "\"3EF\"");
    }
}
