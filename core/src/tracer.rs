use crate::slot::SlotRef;
use crate::store::FixtureStore;
use crate::{Fixture, Round};
use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Longest possible winner chain: R32, R16, QF, SF, Final.
pub const MAX_KNOCKOUT_DEPTH: usize = Round::KNOCKOUT_ROUNDS;

// ---------------------------------------------------------------------------
// Round buckets: the canonical ancestor-tree shape
// ---------------------------------------------------------------------------

/// Fixtures keyed by round, each round ascending by match number without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundBuckets<'a> {
    rounds: BTreeMap<Round, Vec<&'a Fixture>>,
}

impl<'a> RoundBuckets<'a> {
    pub fn insert(&mut self, fixture: &'a Fixture) {
        let bucket = self.rounds.entry(fixture.round).or_default();
        if let Err(at) = bucket.binary_search_by_key(&fixture.match_number, |f| f.match_number) {
            bucket.insert(at, fixture);
        }
    }

    /// Union `other` into `self`.
    pub fn merge(&mut self, other: RoundBuckets<'a>) {
        for fixture in other.rounds.into_values().flatten() {
            self.insert(fixture);
        }
    }

    pub fn round(&self, round: Round) -> &[&'a Fixture] {
        self.rounds.get(&round).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rounds(&self) -> impl Iterator<Item = (Round, &[&'a Fixture])> + '_ {
        self.rounds.iter().map(|(r, f)| (*r, f.as_slice()))
    }

    pub fn get(&self, match_number: u16) -> Option<&'a Fixture> {
        self.rounds
            .values()
            .flatten()
            .find(|f| f.match_number == match_number)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.rounds.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn match_numbers(&self) -> BTreeSet<u16> {
        self.rounds
            .values()
            .flatten()
            .map(|f| f.match_number)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Binary feeder tree: derived view for connector layouts
// ---------------------------------------------------------------------------

/// A fixture and the two fixtures whose winners meet in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeederNode<'a> {
    pub fixture: &'a Fixture,
    /// Home feeder first. `None` for a leaf (a Round of 32 match).
    pub feeders: Option<Box<[FeederNode<'a>; 2]>>,
}

impl<'a> FeederNode<'a> {
    /// Build the binary view of `buckets` rooted at `root`.
    ///
    /// A node gets children only when both of its slots are winner references
    /// to fixtures present in the buckets; half-linked nodes are logged and
    /// kept as leaves.
    pub fn from_buckets(buckets: &RoundBuckets<'a>, root: u16) -> Option<Self> {
        let fixture = buckets.get(root)?;
        let feeders = match (fixture.home.winner_of(), fixture.away.winner_of()) {
            (Some(home), Some(away)) => {
                match (Self::from_buckets(buckets, home), Self::from_buckets(buckets, away)) {
                    (Some(h), Some(a)) => Some(Box::new([h, a])),
                    _ => {
                        warn!("match {root}: feeder {home} or {away} missing from ancestor tree");
                        None
                    }
                }
            }
            (None, None) => None,
            _ => {
                warn!("match {root}: only one side is a winner reference");
                None
            }
        };
        Some(Self { fixture, feeders })
    }

    pub fn is_leaf(&self) -> bool {
        self.feeders.is_none()
    }

    /// Levels of the tree, leaves first, each level in left-to-right tree order.
    /// Adjacent pairs in a level feed the same fixture in the next level.
    pub fn columns(&self) -> Vec<Vec<&'a Fixture>> {
        let mut levels: Vec<Vec<&'a Fixture>> = Vec::new();
        let mut frontier = vec![self];
        while !frontier.is_empty() {
            levels.push(frontier.iter().map(|n| n.fixture).collect());
            frontier = frontier
                .into_iter()
                .filter_map(|n| n.feeders.as_deref())
                .flat_map(|pair| pair.iter())
                .collect();
        }
        levels.reverse();
        levels
    }

    pub fn fixtures(&self) -> Vec<&'a Fixture> {
        let mut out = vec![self.fixture];
        if let Some(pair) = &self.feeders {
            for child in pair.iter() {
                out.extend(child.fixtures());
            }
        }
        out
    }

    pub fn height(&self) -> usize {
        1 + self
            .feeders
            .as_deref()
            .map(|[h, a]| h.height().max(a.height()))
            .unwrap_or(0)
    }
}

/// The Final with its two halves, each rooted at one Semi-final.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketSplit<'a> {
    pub final_fixture: &'a Fixture,
    pub third_place: Option<&'a Fixture>,
    pub left: FeederNode<'a>,
    pub right: FeederNode<'a>,
}

// ---------------------------------------------------------------------------
// Tracer
// ---------------------------------------------------------------------------

/// Walks winner links between knockout fixtures.
///
/// Integrity problems (ambiguous links, over-long or cyclic chains) are
/// logged and turn into `None` or empty results.
#[derive(Debug, Clone, Copy)]
pub struct BracketTracer<'a> {
    store: &'a FixtureStore,
}

impl<'a> BracketTracer<'a> {
    pub fn new(store: &'a FixtureStore) -> Self {
        Self { store }
    }

    /// The Round of 32 fixture seeded by `slot`, e.g. "1A" or "3ABCDF".
    pub fn find_entry_match(&self, slot: &SlotRef) -> Option<&'a Fixture> {
        let claims: Vec<&Fixture> = self
            .store
            .fixtures_in_round(Round::RoundOf32)
            .into_iter()
            .filter(|f| f.side_of(slot).is_some())
            .collect();
        match claims.as_slice() {
            [] => None,
            [entry] => Some(*entry),
            _ => {
                warn!("slot {slot} is claimed by {} Round of 32 fixtures", claims.len());
                None
            }
        }
    }

    /// Every fixture with a `W{match_number}` slot. More than one is an integrity violation.
    pub fn winner_links(&self, match_number: u16) -> Vec<&'a Fixture> {
        let winner = SlotRef::Winner(match_number);
        self.store
            .fixtures()
            .filter(|f| f.side_of(&winner).is_some())
            .collect()
    }

    /// The fixture the winner of `match_number` plays next.
    pub fn find_successor(&self, match_number: u16) -> Option<&'a Fixture> {
        match self.winner_links(match_number).as_slice() {
            [] => None,
            [next] => Some(*next),
            links => {
                warn!("winner of match {match_number} feeds {} fixtures", links.len());
                None
            }
        }
    }

    /// Where the loser of `match_number` plays, i.e. the third-place playoff
    /// for a Semi-final. Both Semi-final losers share that one fixture.
    pub fn loser_destination(&self, match_number: u16) -> Option<&'a Fixture> {
        let loser = SlotRef::Loser(match_number);
        self.store.fixtures().find(|f| f.side_of(&loser).is_some())
    }

    /// `start` followed by each successive fixture its winner plays, ending
    /// at the Final. `None` if the chain branches, cycles or runs longer
    /// than the knockout rounds allow.
    pub fn trace_linear_path(&self, start: &'a Fixture) -> Option<Vec<&'a Fixture>> {
        let mut path = vec![start];
        let mut current = start;
        loop {
            let next = match self.winner_links(current.match_number).as_slice() {
                [] => return Some(path),
                [next] => *next,
                links => {
                    warn!(
                        "path from match {}: winner of {} feeds {} fixtures",
                        start.match_number,
                        current.match_number,
                        links.len()
                    );
                    return None;
                }
            };
            if path.iter().any(|f| f.match_number == next.match_number) {
                warn!("path from match {}: cycle at match {}", start.match_number, next.match_number);
                return None;
            }
            if path.len() >= MAX_KNOCKOUT_DEPTH {
                warn!(
                    "path from match {} exceeds {MAX_KNOCKOUT_DEPTH} knockout rounds",
                    start.match_number
                );
                return None;
            }
            path.push(next);
            current = next;
        }
    }

    /// Every fixture feeding `match_number` through winner references,
    /// bucketed by round and including the fixture itself.
    pub fn trace_ancestor_tree(&self, match_number: u16) -> RoundBuckets<'a> {
        self.ancestors(match_number, 1)
    }

    fn ancestors(&self, match_number: u16, depth: usize) -> RoundBuckets<'a> {
        let mut buckets = RoundBuckets::default();
        let Some(fixture) = self.store.fixture(match_number) else {
            warn!("winner reference to missing match {match_number}");
            return buckets;
        };
        buckets.insert(fixture);

        if depth >= MAX_KNOCKOUT_DEPTH {
            if fixture.winner_feeders().next().is_some() {
                warn!("ancestor tree below match {match_number} is deeper than {MAX_KNOCKOUT_DEPTH} rounds");
            }
            return buckets;
        }
        for feeder in fixture.winner_feeders() {
            if feeder >= match_number {
                warn!("match {match_number} references later match {feeder}");
                continue;
            }
            buckets.merge(self.ancestors(feeder, depth + 1));
        }
        buckets
    }

    /// Same membership as [`Self::trace_ancestor_tree`], built with a work list.
    pub fn collect_ancestors(&self, match_number: u16) -> RoundBuckets<'a> {
        let mut buckets = RoundBuckets::default();
        let mut pending = vec![match_number];
        let mut seen = BTreeSet::new();
        while let Some(n) = pending.pop() {
            if !seen.insert(n) {
                continue;
            }
            let Some(fixture) = self.store.fixture(n) else {
                continue;
            };
            buckets.insert(fixture);
            pending.extend(fixture.winner_feeders().filter(|&f| f < n));
        }
        buckets
    }

    /// Split the main bracket at the Final into two Semi-final halves.
    pub fn split_bracket(&self) -> Option<BracketSplit<'a>> {
        let Some(final_fixture) = self.store.final_fixture() else {
            warn!("no unique Final fixture");
            return None;
        };
        let (Some(left), Some(right)) = (final_fixture.home.winner_of(), final_fixture.away.winner_of())
        else {
            warn!("Final slots are not both winner references");
            return None;
        };
        let half = |root: u16| FeederNode::from_buckets(&self.trace_ancestor_tree(root), root);
        Some(BracketSplit {
            final_fixture,
            third_place: self.store.third_place_fixture(),
            left: half(left)?,
            right: half(right)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use pretty_assertions::assert_eq;

    fn synthetic() -> FixtureStore {
        FixtureStore::from_raw(testdata::dataset()).expect("test data")
    }

    fn embedded() -> FixtureStore {
        FixtureStore::embedded().expect("embedded data should parse")
    }

    fn numbers(fixtures: &[&Fixture]) -> Vec<u16> {
        fixtures.iter().map(|f| f.match_number).collect()
    }

    #[test]
    fn entry_match_for_group_position_and_pool() {
        let store = synthetic();
        let tracer = BracketTracer::new(&store);
        let entry = |code: &str| tracer.find_entry_match(&SlotRef::parse(code, |_| false)).map(|f| f.match_number);
        assert_eq!(entry("1A"), Some(73));
        assert_eq!(entry("3ABCD"), Some(74));
        assert_eq!(entry("3ABC"), None);
    }

    #[test]
    fn ambiguous_entry_slot_is_reported_not_picked() {
        let mut raw = testdata::dataset();
        let r32 = raw.fixtures.iter_mut().find(|f| f.match_number == 75).expect("match 75");
        r32.home_team = "1A".into();
        let store = FixtureStore::from_raw(raw).expect("test data");
        let tracer = BracketTracer::new(&store);
        assert!(tracer.find_entry_match(&SlotRef::GroupPosition { position: 1, group: 'A' }).is_none());
    }

    #[test]
    fn successor_is_unique_except_for_semi_final_losers() {
        let store = embedded();
        let tracer = BracketTracer::new(&store);
        for fixture in store.knockout_fixtures() {
            assert!(tracer.winner_links(fixture.match_number).len() <= 1);
        }
        let third = store.third_place_fixture().map(|f| f.match_number);
        assert_eq!(tracer.loser_destination(101).map(|f| f.match_number), third);
        assert_eq!(tracer.loser_destination(102).map(|f| f.match_number), third);
        assert!(tracer.find_successor(104).is_none());
    }

    #[test]
    fn linear_path_from_every_round_of_32_match_ends_at_final() {
        for store in [synthetic(), embedded()] {
            let tracer = BracketTracer::new(&store);
            let final_number = store.final_fixture().map(|f| f.match_number);
            for r32 in store.fixtures_in_round(Round::RoundOf32) {
                let path = tracer.trace_linear_path(r32).expect("path");
                assert_eq!(path.len(), MAX_KNOCKOUT_DEPTH);
                assert_eq!(path.last().map(|f| f.match_number), final_number);
                let rounds: Vec<Round> = path.iter().map(|f| f.round).collect();
                assert_eq!(
                    rounds,
                    vec![Round::RoundOf32, Round::RoundOf16, Round::QuarterFinal, Round::SemiFinal, Round::Final]
                );
            }
        }
    }

    #[test]
    fn linear_path_follows_winner_links() {
        let store = embedded();
        let tracer = BracketTracer::new(&store);
        let start = store.fixture(74).expect("match 74");
        let path = tracer.trace_linear_path(start).expect("path");
        assert_eq!(numbers(&path), vec![74, 89, 97, 101, 104]);
    }

    #[test]
    fn branching_winner_link_aborts_the_path() {
        let mut raw = testdata::dataset();
        raw.fixtures.push(testdata::fixture(105, "final", "W73", "W74"));
        let store = FixtureStore::from_raw(raw).expect("test data");
        let tracer = BracketTracer::new(&store);
        let start = store.fixture(73).expect("match 73");
        assert!(tracer.trace_linear_path(start).is_none());
        assert!(tracer.find_successor(73).is_none());
    }

    #[test]
    fn over_long_chain_is_cut_off() {
        let mut raw = testdata::dataset();
        raw.fixtures.push(testdata::fixture(105, "final", "W104", "TBD"));
        let store = FixtureStore::from_raw(raw).expect("test data");
        let tracer = BracketTracer::new(&store);
        let start = store.fixture(73).expect("match 73");
        assert!(tracer.trace_linear_path(start).is_none());
    }

    #[test]
    fn final_ancestor_tree_has_thirty_one_fixtures() {
        for store in [synthetic(), embedded()] {
            let tracer = BracketTracer::new(&store);
            let tree = tracer.trace_ancestor_tree(104);
            assert_eq!(tree.len(), 31);
            assert_eq!(tree.round(Round::RoundOf32).len(), 16);
            assert_eq!(tree.round(Round::RoundOf16).len(), 8);
            assert_eq!(tree.round(Round::QuarterFinal).len(), 4);
            assert_eq!(tree.round(Round::SemiFinal).len(), 2);
            assert_eq!(tree.round(Round::Final).len(), 1);
            assert!(tree.round(Round::ThirdPlace).is_empty());
        }
    }

    #[test]
    fn round_buckets_are_sorted_by_match_number() {
        let store = embedded();
        let tree = BracketTracer::new(&store).trace_ancestor_tree(104);
        for (_, fixtures) in tree.rounds() {
            let numbers = numbers(fixtures);
            let mut sorted = numbers.clone();
            sorted.sort();
            assert_eq!(numbers, sorted);
        }
    }

    #[test]
    fn semi_final_halves_partition_the_final_tree() {
        for store in [synthetic(), embedded()] {
            let tracer = BracketTracer::new(&store);
            let whole = tracer.trace_ancestor_tree(104).match_numbers();
            let left = tracer.trace_ancestor_tree(101).match_numbers();
            let right = tracer.trace_ancestor_tree(102).match_numbers();
            assert!(left.is_disjoint(&right));
            assert_eq!(left.len() + right.len() + 1, whole.len());
            let mut union: BTreeSet<u16> = left.union(&right).copied().collect();
            union.insert(104);
            assert_eq!(union, whole);
        }
    }

    #[test]
    fn recursive_and_work_list_traversals_agree() {
        for store in [synthetic(), embedded()] {
            let tracer = BracketTracer::new(&store);
            for fixture in store.knockout_fixtures() {
                let n = fixture.match_number;
                assert_eq!(tracer.trace_ancestor_tree(n), tracer.collect_ancestors(n), "match {n}");
            }
        }
    }

    #[test]
    fn root_plus_feeder_subtrees_equals_full_tree() {
        let store = embedded();
        let tracer = BracketTracer::new(&store);
        let mut manual = RoundBuckets::default();
        manual.insert(store.fixture(104).expect("final"));
        manual.merge(tracer.trace_ancestor_tree(101));
        manual.merge(tracer.trace_ancestor_tree(102));
        assert_eq!(manual, tracer.trace_ancestor_tree(104));
    }

    #[test]
    fn round_of_32_fixture_is_its_own_tree() {
        let store = embedded();
        let tree = BracketTracer::new(&store).trace_ancestor_tree(73);
        assert_eq!(tree.match_numbers().into_iter().collect::<Vec<_>>(), vec![73]);
    }

    #[test]
    fn missing_match_gives_empty_tree() {
        let store = embedded();
        assert!(BracketTracer::new(&store).trace_ancestor_tree(999).is_empty());
    }

    #[test]
    fn feeder_tree_matches_bucket_membership() {
        let store = embedded();
        let tracer = BracketTracer::new(&store);
        let buckets = tracer.trace_ancestor_tree(104);
        let tree = FeederNode::from_buckets(&buckets, 104).expect("tree");
        let from_tree: BTreeSet<u16> = tree.fixtures().iter().map(|f| f.match_number).collect();
        assert_eq!(from_tree, buckets.match_numbers());
        assert_eq!(tree.height(), MAX_KNOCKOUT_DEPTH);
    }

    #[test]
    fn feeder_children_are_the_referenced_fixtures() {
        fn check(node: &FeederNode) {
            if let Some([home, away]) = node.feeders.as_deref() {
                assert_eq!(node.fixture.home, SlotRef::Winner(home.fixture.match_number));
                assert_eq!(node.fixture.away, SlotRef::Winner(away.fixture.match_number));
                check(home);
                check(away);
            } else {
                assert_eq!(node.fixture.round, Round::RoundOf32);
            }
        }
        let store = embedded();
        let split = BracketTracer::new(&store).split_bracket().expect("split");
        check(&split.left);
        check(&split.right);
    }

    #[test]
    fn columns_pair_siblings_in_tree_order() {
        let store = embedded();
        let split = BracketTracer::new(&store).split_bracket().expect("split");
        let columns = split.left.columns();
        let widths: Vec<usize> = columns.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![8, 4, 2, 1]);
        // Match 89 is W74 v W77, so 74 and 77 sit together even though they are not adjacent numbers.
        assert_eq!(numbers(&columns[0])[..2].to_vec(), vec![74, 77]);
        for depth in 1..columns.len() {
            for (i, parent) in columns[depth].iter().enumerate() {
                assert_eq!(parent.home, SlotRef::Winner(columns[depth - 1][2 * i].match_number));
                assert_eq!(parent.away, SlotRef::Winner(columns[depth - 1][2 * i + 1].match_number));
            }
        }
    }

    #[test]
    fn adjacent_numbering_gives_sorted_columns() {
        let store = synthetic();
        let split = BracketTracer::new(&store).split_bracket().expect("split");
        let columns = split.left.columns();
        assert_eq!(numbers(&columns[0]), (73..=80).collect::<Vec<_>>());
        assert_eq!(numbers(&split.right.columns()[0]), (81..=88).collect::<Vec<_>>());
    }

    #[test]
    fn split_includes_final_and_third_place() {
        let store = embedded();
        let split = BracketTracer::new(&store).split_bracket().expect("split");
        assert_eq!(split.final_fixture.match_number, 104);
        assert_eq!(split.third_place.map(|f| f.match_number), Some(103));
        assert_eq!(split.left.fixture.match_number, 101);
        assert_eq!(split.right.fixture.match_number, 102);
    }
}
