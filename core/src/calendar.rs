use crate::store::FixtureStore;
use crate::Fixture;
use chrono::{DateTime, TimeDelta, Utc};

const MATCH_DURATION_HOURS: i64 = 2;
const UID_DOMAIN: &str = "worldcup2026fan.com";

/// Escape text for an iCalendar property value.
pub fn escape_ics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ',' | ';' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

pub fn ics_file_name(team_id: &str) -> String {
    format!("wc2026-{team_id}-fixtures.ics")
}

fn ics_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// A VCALENDAR with one VEVENT per fixture, CRLF line endings.
pub fn generate_ics(store: &FixtureStore, fixtures: &[&Fixture], team_id: &str) -> String {
    let team_label = store
        .team(team_id)
        .map(|t| t.name.as_str())
        .unwrap_or(team_id);

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_owned(),
        "VERSION:2.0".to_owned(),
        "PRODID:-//World Cup 2026 Fan Companion//EN".to_owned(),
        format!("X-WR-CALNAME:World Cup 2026 - {}", escape_ics(team_label)),
    ];

    for f in fixtures {
        let start = f.kickoff();
        let end = start + TimeDelta::hours(MATCH_DURATION_HOURS);
        let summary = format!("{} vs {}", store.team_name(&f.home), store.team_name(&f.away));
        let stage = match f.group {
            Some(group) => format!("Group {group}"),
            None => f.round.label().to_owned(),
        };
        let location = store
            .venue(&f.venue)
            .map(|v| format!("{}, {}", v.name, v.display_city))
            .unwrap_or_default();

        lines.extend([
            "BEGIN:VEVENT".to_owned(),
            format!("DTSTART:{}", ics_timestamp(start)),
            format!("DTEND:{}", ics_timestamp(end)),
            format!("SUMMARY:{}", escape_ics(&summary)),
            format!("DESCRIPTION:{}", escape_ics(&format!("World Cup 2026 - {stage}"))),
            format!("LOCATION:{}", escape_ics(&location)),
            format!("UID:wc2026-match-{}@{UID_DOMAIN}", f.match_number),
            "END:VEVENT".to_owned(),
        ]);
    }

    lines.push("END:VCALENDAR".to_owned());
    lines.join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_separators_and_newlines() {
        assert_eq!(escape_ics("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn file_name_uses_team_id() {
        assert_eq!(ics_file_name("mex"), "wc2026-mex-fixtures.ics");
    }

    #[test]
    fn one_event_per_fixture_with_crlf() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let fixtures = store.team_fixtures("mex");
        let ics = generate_ics(&store, &fixtures, "mex");

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.ends_with("END:VCALENDAR"));
        assert!(!ics.replace("\r\n", "").contains('\n'));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), fixtures.len());
        assert!(ics.contains("X-WR-CALNAME:World Cup 2026 - Mexico"));
        assert!(ics.contains("UID:wc2026-match-1@worldcup2026fan.com"));
        assert!(ics.contains("SUMMARY:Mexico vs South Africa"));
        assert!(ics.contains("DESCRIPTION:World Cup 2026 - Group A"));
        assert!(ics.contains("LOCATION:Estadio Azteca\\, Mexico City"));
    }

    #[test]
    fn end_is_two_hours_after_start_across_midnight() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let fixture = store.fixture(83).expect("match 83");
        let ics = generate_ics(&store, &[fixture], "eng");
        assert!(ics.contains("DTSTART:20260702T230000Z"));
        assert!(ics.contains("DTEND:20260703T010000Z"));
        assert!(ics.contains("SUMMARY:Runner-up Group K vs Runner-up Group L"));
        assert!(ics.contains("DESCRIPTION:World Cup 2026 - Round of 32"));
    }

    #[test]
    fn unknown_team_keeps_id_in_title() {
        let store = FixtureStore::embedded().expect("embedded data should parse");
        let ics = generate_ics(&store, &[], "atl");
        assert!(ics.contains("X-WR-CALNAME:World Cup 2026 - atl"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }
}
