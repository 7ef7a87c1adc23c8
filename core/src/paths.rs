use crate::slot::{OpponentDescription, SlotRef, SlotResolver};
use crate::store::FixtureStore;
use crate::tracer::BracketTracer;
use crate::{Fixture, Round, Side, Venue};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::warn;
use serde::Serialize;

/// One fixture on a team's route, seen from that team's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub match_number: u16,
    pub round: Round,
    pub date: NaiveDate,
    pub time_utc: NaiveTime,
    pub venue_id: String,
    /// Venue name, or the raw id when the venue is unknown.
    pub venue_name: String,
    pub venue_city: Option<String>,
    pub home: SlotRef,
    pub away: SlotRef,
    pub our_side: Side,
    pub opponent: Option<OpponentDescription>,
}

impl PathStep {
    pub fn kickoff(&self) -> DateTime<Utc> {
        self.date.and_time(self.time_utc).and_utc()
    }

    pub fn our_slot(&self) -> &SlotRef {
        match self.our_side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Route for a team that qualifies as one of the best third-placed teams
/// through a particular pool slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThirdPlaceScenario {
    pub r32_match: u16,
    pub pool: SlotRef,
    pub opponent: Option<OpponentDescription>,
    pub venue: Option<Venue>,
    pub date: NaiveDate,
    pub path: Vec<PathStep>,
}

/// A group's route to the Final for each finishing position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KnockoutPaths {
    pub first: Option<Vec<PathStep>>,
    pub second: Option<Vec<PathStep>>,
    pub third: Vec<ThirdPlaceScenario>,
}

/// Stateless queries combining the tracer and the resolver. Every call
/// recomputes from the store.
#[derive(Debug, Clone, Copy)]
pub struct KnockoutPathService<'a> {
    store: &'a FixtureStore,
    resolver: SlotResolver<'a>,
    tracer: BracketTracer<'a>,
}

impl<'a> KnockoutPathService<'a> {
    pub fn new(store: &'a FixtureStore) -> Self {
        Self {
            store,
            resolver: SlotResolver::new(store),
            tracer: BracketTracer::new(store),
        }
    }

    pub fn knockout_paths(&self, group: char) -> KnockoutPaths {
        KnockoutPaths {
            first: self.path_for_first_place(group),
            second: self.path_for_second_place(group),
            third: self.paths_for_qualifying_third(group),
        }
    }

    /// Route of the group winner, or `None` if no Round of 32 fixture takes "1{group}".
    pub fn path_for_first_place(&self, group: char) -> Option<Vec<PathStep>> {
        self.path_for_position(1, group)
    }

    pub fn path_for_second_place(&self, group: char) -> Option<Vec<PathStep>> {
        self.path_for_position(2, group)
    }

    /// One scenario per Round of 32 pool slot that lists `group`. A group may
    /// appear in no pool or in several.
    pub fn paths_for_qualifying_third(&self, group: char) -> Vec<ThirdPlaceScenario> {
        let mut scenarios = Vec::new();
        for fixture in self.store.fixtures_in_round(Round::RoundOf32) {
            for side in [Side::Home, Side::Away] {
                let pool = fixture.slot(side);
                if !pool.pool_includes(group) {
                    continue;
                }
                let Some(path) = self.build_path(fixture, pool) else {
                    continue;
                };
                scenarios.push(ThirdPlaceScenario {
                    r32_match: fixture.match_number,
                    pool: pool.clone(),
                    opponent: self.resolver.describe(fixture.slot(side.other()), None),
                    venue: self.store.venue(&fixture.venue).cloned(),
                    date: fixture.date,
                    path,
                });
            }
        }
        scenarios
    }

    fn path_for_position(&self, position: u8, group: char) -> Option<Vec<PathStep>> {
        let seed = SlotRef::GroupPosition { position, group };
        let entry = self.tracer.find_entry_match(&seed)?;
        self.build_path(entry, &seed)
    }

    /// Trace from `entry` and describe each opponent. At the entry match our
    /// side holds `seed`; afterwards it holds the winner reference to the
    /// previous step.
    fn build_path(&self, entry: &'a Fixture, seed: &SlotRef) -> Option<Vec<PathStep>> {
        let fixtures = self.tracer.trace_linear_path(entry)?;
        let mut steps = Vec::with_capacity(fixtures.len());
        let mut ours = seed.clone();
        for fixture in fixtures {
            let Some(our_side) = fixture.side_of(&ours) else {
                warn!("match {}: neither side is {ours}", fixture.match_number);
                return None;
            };
            steps.push(self.step(fixture, our_side));
            ours = SlotRef::Winner(fixture.match_number);
        }
        Some(steps)
    }

    fn step(&self, fixture: &Fixture, our_side: Side) -> PathStep {
        let venue = self.store.venue(&fixture.venue);
        PathStep {
            match_number: fixture.match_number,
            round: fixture.round,
            date: fixture.date,
            time_utc: fixture.time_utc,
            venue_id: fixture.venue.clone(),
            venue_name: venue
                .map(|v| v.name.clone())
                .unwrap_or_else(|| fixture.venue.clone()),
            venue_city: venue.map(|v| v.display_city.clone()),
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            our_side,
            opponent: self
                .resolver
                .describe(fixture.slot(our_side.other()), Some(fixture.slot(our_side))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::OpponentKind;
    use crate::testdata;
    use pretty_assertions::assert_eq;

    fn synthetic() -> FixtureStore {
        FixtureStore::from_raw(testdata::dataset()).expect("test data")
    }

    fn labels(steps: &[PathStep]) -> Vec<String> {
        steps
            .iter()
            .map(|s| s.opponent.as_ref().map(|o| o.label.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn group_winner_path_runs_to_the_final() {
        let store = synthetic();
        let service = KnockoutPathService::new(&store);
        let path = service.path_for_first_place('A').expect("path for 1A");

        let rounds: Vec<Round> = path.iter().map(|s| s.round).collect();
        assert_eq!(
            rounds,
            vec![Round::RoundOf32, Round::RoundOf16, Round::QuarterFinal, Round::SemiFinal, Round::Final]
        );
        let labels = labels(&path);
        assert!(labels.iter().any(|l| l.contains("Group B")), "{labels:?}");
        assert!(labels.iter().all(|l| !l.contains("2B")), "{labels:?}");
        assert_eq!(labels[0], "Runner-up of Group B");
        assert_eq!(labels[1], "Winner of Winner Group C vs Best 3rd (ABCD)");
        assert_eq!(labels[4], "Winner of Winner Match 99 vs Winner Match 100");
    }

    #[test]
    fn our_side_follows_the_traced_lineage() {
        let store = synthetic();
        let service = KnockoutPathService::new(&store);
        let path = service.path_for_second_place('B').expect("path for 2B");
        assert_eq!(path[0].match_number, 73);
        assert_eq!(path[0].our_side, Side::Away);
        assert_eq!(path[0].our_slot(), &SlotRef::GroupPosition { position: 2, group: 'B' });
        for pair in path.windows(2) {
            assert_eq!(pair[1].our_slot(), &SlotRef::Winner(pair[0].match_number));
        }
        let opponent = path[0].opponent.as_ref().expect("opponent");
        assert_eq!(opponent.kind, OpponentKind::GroupWinner);
        assert_eq!(opponent.candidates.len(), 2);
    }

    #[test]
    fn right_half_team_meets_left_half_in_final() {
        let store = synthetic();
        let service = KnockoutPathService::new(&store);
        let path = service.path_for_first_place('I').expect("path for 1I");
        assert_eq!(path[0].match_number, 81);
        let last = path.last().expect("final step");
        assert_eq!(last.our_side, Side::Away);
        assert_eq!(last.opponent.as_ref().map(|o| o.match_number), Some(Some(101)));
    }

    #[test]
    fn pool_with_group_yields_single_scenario() {
        let store = synthetic();
        let service = KnockoutPathService::new(&store);
        let scenarios = service.paths_for_qualifying_third('B');
        assert_eq!(scenarios.len(), 1);
        let scenario = &scenarios[0];
        assert_eq!(scenario.r32_match, 74);
        assert_eq!(scenario.pool, SlotRef::ThirdPlacePool(vec!['A', 'B', 'C', 'D']));
        assert_eq!(scenario.opponent.as_ref().map(|o| o.label.as_str()), Some("Winner of Group C"));
        assert_eq!(scenario.venue.as_ref().map(|v| v.id.as_str()), Some("east"));
        assert_eq!(scenario.path.len(), 5);
        assert_eq!(scenario.path[0].our_side, Side::Away);
    }

    #[test]
    fn group_can_sit_in_several_pools() {
        let store = synthetic();
        let service = KnockoutPathService::new(&store);
        let matches: Vec<u16> = service
            .paths_for_qualifying_third('A')
            .iter()
            .map(|s| s.r32_match)
            .collect();
        assert_eq!(matches, vec![74, 80, 84]);
    }

    #[test]
    fn unknown_group_has_no_paths() {
        let store = synthetic();
        let paths = KnockoutPathService::new(&store).knockout_paths('M');
        assert_eq!(paths, KnockoutPaths::default());
    }

    #[test]
    fn unknown_venue_falls_back_to_id() {
        let mut raw = testdata::dataset();
        for f in raw.fixtures.iter_mut().filter(|f| f.match_number == 73) {
            f.venue = "atlantis".into();
        }
        let store = FixtureStore::from_raw(raw).expect("test data");
        let path = KnockoutPathService::new(&store)
            .path_for_first_place('A')
            .expect("path");
        assert_eq!(path[0].venue_name, "atlantis");
        assert!(path[0].venue_city.is_none());
    }

    #[test]
    fn every_embedded_group_has_all_three_scenarios() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let service = KnockoutPathService::new(&store);
        for group in store.groups() {
            let paths = service.knockout_paths(group);
            assert_eq!(paths.first.as_ref().map(Vec::len), Some(5), "group {group}");
            assert_eq!(paths.second.as_ref().map(Vec::len), Some(5), "group {group}");
            assert!(!paths.third.is_empty(), "group {group}");
        }
    }

    #[test]
    fn embedded_mexico_route_starts_in_mexico_city() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let path = KnockoutPathService::new(&store)
            .path_for_first_place('A')
            .expect("path for 1A");
        assert_eq!(path[0].match_number, 79);
        assert_eq!(path[0].venue_city.as_deref(), Some("Mexico City"));
        assert_eq!(
            path.iter().map(|s| s.match_number).collect::<Vec<_>>(),
            vec![79, 92, 99, 102, 104]
        );
    }

    #[test]
    fn paths_serialize_slot_codes() {
        let store = synthetic();
        let paths = KnockoutPathService::new(&store).knockout_paths('B');
        let json = serde_json::to_value(&paths).expect("serialize");
        assert_eq!(json["second"][0]["away"], "2B");
        assert_eq!(json["third"][0]["pool"], "3ABCD");
    }
}
