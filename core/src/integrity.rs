use crate::slot::SlotRef;
use crate::store::FixtureStore;
use crate::tracer::BracketTracer;
use crate::{Round, Side};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A structural defect in the bracket data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IntegrityIssue {
    /// A winner or loser reference to a match that does not exist.
    DanglingReference { match_number: u16, slot: SlotRef },
    /// A reference to a match that is not strictly earlier.
    ForwardReference { match_number: u16, slot: SlotRef },
    /// One match's winner feeds more than one fixture.
    DuplicateWinnerLink { source: u16, fixtures: Vec<u16> },
    /// More than one Round of 32 fixture claims the same seed slot.
    DuplicateEntrySlot { slot: String, fixtures: Vec<u16> },
    /// A loser reference to anything but a Semi-final.
    LoserOutsideSemiFinal { match_number: u16, slot: SlotRef },
    /// The winner chain from this Round of 32 match does not reach the Final.
    UnterminatedPath { start: u16 },
    /// There must be exactly one Final.
    FinalCount(usize),
    UnknownVenue { match_number: u16, venue: String },
    /// An unrecognised slot text in a knockout fixture.
    LiteralKnockoutSlot { match_number: u16, slot: SlotRef },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::DanglingReference { match_number, slot } => {
                write!(f, "match {match_number}: {slot} points to a missing match")
            }
            IntegrityIssue::ForwardReference { match_number, slot } => {
                write!(f, "match {match_number}: {slot} is not an earlier match")
            }
            IntegrityIssue::DuplicateWinnerLink { source, fixtures } => {
                write!(f, "winner of match {source} feeds matches {fixtures:?}")
            }
            IntegrityIssue::DuplicateEntrySlot { slot, fixtures } => {
                write!(f, "slot {slot} seeds matches {fixtures:?}")
            }
            IntegrityIssue::LoserOutsideSemiFinal { match_number, slot } => {
                write!(f, "match {match_number}: {slot} is not a Semi-final loser")
            }
            IntegrityIssue::UnterminatedPath { start } => {
                write!(f, "winner chain from match {start} does not reach the Final")
            }
            IntegrityIssue::FinalCount(n) => write!(f, "expected one Final, found {n}"),
            IntegrityIssue::UnknownVenue { match_number, venue } => {
                write!(f, "match {match_number}: unknown venue {venue}")
            }
            IntegrityIssue::LiteralKnockoutSlot { match_number, slot } => {
                write!(f, "match {match_number}: unrecognised slot {slot:?}")
            }
        }
    }
}

/// Check every bracket invariant the tracer relies on. An empty result
/// means paths and layouts can be trusted.
pub fn check_bracket(store: &FixtureStore) -> Vec<IntegrityIssue> {
    let tracer = BracketTracer::new(store);
    let mut issues = Vec::new();

    let finals = store.fixtures_in_round(Round::Final).len();
    if finals != 1 {
        issues.push(IntegrityIssue::FinalCount(finals));
    }

    for fixture in store.fixtures() {
        let n = fixture.match_number;
        if store.venue(&fixture.venue).is_none() {
            issues.push(IntegrityIssue::UnknownVenue {
                match_number: n,
                venue: fixture.venue.clone(),
            });
        }

        for side in [Side::Home, Side::Away] {
            let slot = fixture.slot(side);
            let target = match slot {
                SlotRef::Winner(t) | SlotRef::Loser(t) => *t,
                SlotRef::Literal(_) if fixture.round.is_knockout() => {
                    issues.push(IntegrityIssue::LiteralKnockoutSlot {
                        match_number: n,
                        slot: slot.clone(),
                    });
                    continue;
                }
                _ => continue,
            };
            let Some(source) = store.fixture(target) else {
                issues.push(IntegrityIssue::DanglingReference { match_number: n, slot: slot.clone() });
                continue;
            };
            if target >= n {
                issues.push(IntegrityIssue::ForwardReference { match_number: n, slot: slot.clone() });
            }
            if slot.loser_of().is_some() && source.round != Round::SemiFinal {
                issues.push(IntegrityIssue::LoserOutsideSemiFinal { match_number: n, slot: slot.clone() });
            }
        }

        let links = tracer.winner_links(n);
        if links.len() > 1 {
            issues.push(IntegrityIssue::DuplicateWinnerLink {
                source: n,
                fixtures: links.iter().map(|f| f.match_number).collect(),
            });
        }
    }

    let mut entries: BTreeMap<String, Vec<u16>> = BTreeMap::new();
    let r32 = store.fixtures_in_round(Round::RoundOf32);
    for fixture in &r32 {
        for slot in [&fixture.home, &fixture.away] {
            if slot.is_entry_code() {
                entries.entry(slot.to_string()).or_default().push(fixture.match_number);
            }
        }
    }
    for (slot, fixtures) in entries {
        if fixtures.len() > 1 {
            issues.push(IntegrityIssue::DuplicateEntrySlot { slot, fixtures });
        }
    }

    for fixture in r32 {
        let reaches_final = tracer
            .trace_linear_path(fixture)
            .and_then(|path| path.last().map(|f| f.round == Round::Final))
            .unwrap_or(false);
        if !reaches_final {
            issues.push(IntegrityIssue::UnterminatedPath { start: fixture.match_number });
        }
    }

    issues
}
