//! Kickoff formatting in a chosen timezone.
//!
//! The tournament runs from 11 June to 19 July, inside a single daylight-saving
//! period for every zone listed here, so each zone is a fixed offset.

use crate::Venue;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;

pub const VENUE_LOCAL: &str = "venue-local";
pub const FALLBACK_ZONE: &str = "Europe/London";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub abbr: &'static str,
    /// UTC offset in minutes during the tournament.
    pub offset_minutes: i32,
}

const fn zone(id: &'static str, label: &'static str, abbr: &'static str, offset_minutes: i32) -> ZoneInfo {
    ZoneInfo { id, label, abbr, offset_minutes }
}

/// Selectable zones, in picker order.
pub const ZONES: &[ZoneInfo] = &[
    zone("Europe/London", "London (GMT/BST)", "BST", 60),
    zone("Europe/Paris", "Paris / Berlin (CET)", "CEST", 120),
    zone("Europe/Istanbul", "Istanbul (TRT)", "TRT", 180),
    zone("Asia/Dubai", "Dubai (GST)", "GST", 240),
    zone("Asia/Kolkata", "Mumbai (IST)", "IST", 330),
    zone("Asia/Bangkok", "Bangkok (ICT)", "ICT", 420),
    zone("Asia/Shanghai", "Shanghai / Hong Kong", "CST", 480),
    zone("Asia/Tokyo", "Tokyo (JST)", "JST", 540),
    zone("Australia/Sydney", "Sydney (AEST)", "AEST", 600),
    zone("Pacific/Auckland", "Auckland (NZST)", "NZST", 720),
    zone("America/New_York", "US Eastern (ET)", "EDT", -240),
    zone("America/Chicago", "US Central (CT)", "CDT", -300),
    zone("America/Denver", "US Mountain (MT)", "MDT", -360),
    zone("America/Los_Angeles", "US Pacific (PT)", "PDT", -420),
    zone("America/Mexico_City", "Mexico City (CST)", "CST", -360),
    zone("America/Sao_Paulo", "São Paulo (BRT)", "BRT", -180),
    zone("America/Argentina/Buenos_Aires", "Buenos Aires (ART)", "ART", -180),
    zone("America/Toronto", "Toronto (ET)", "EDT", -240),
    zone("America/Vancouver", "Vancouver (PT)", "PDT", -420),
    zone("Africa/Lagos", "Lagos (WAT)", "WAT", 60),
    zone("Africa/Cairo", "Cairo (EET)", "EEST", 180),
    zone("Africa/Johannesburg", "Johannesburg (SAST)", "SAST", 120),
    zone("America/Monterrey", "Monterrey (CST)", "CST", -360),
    zone("UTC", "UTC", "UTC", 0),
];

pub fn zone_info(id: &str) -> Option<&'static ZoneInfo> {
    ZONES.iter().find(|z| z.id == id)
}

/// Offset for an IANA zone id; unknown zones fall back to UTC.
pub fn zone_offset(id: &str) -> FixedOffset {
    let minutes = zone_info(id).map(|z| z.offset_minutes).unwrap_or_else(|| {
        debug!("unknown timezone {id}, using UTC");
        0
    });
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Guess the viewer's zone from `TZ`, falling back to London.
pub fn detect_timezone() -> String {
    env::var("TZ")
        .ok()
        .map(|tz| tz.trim_start_matches(':').to_owned())
        .filter(|tz| zone_info(tz).is_some())
        .unwrap_or_else(|| FALLBACK_ZONE.to_owned())
}

/// How kickoff times are shown. Stored in preferences as the zone id or "venue-local".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimezoneMode {
    Zone(String),
    /// Each fixture in its own venue's zone.
    VenueLocal,
}

impl Default for TimezoneMode {
    fn default() -> Self {
        TimezoneMode::Zone(FALLBACK_ZONE.to_owned())
    }
}

impl From<String> for TimezoneMode {
    fn from(setting: String) -> Self {
        if setting == VENUE_LOCAL {
            TimezoneMode::VenueLocal
        } else {
            TimezoneMode::Zone(setting)
        }
    }
}

impl From<TimezoneMode> for String {
    fn from(mode: TimezoneMode) -> Self {
        match mode {
            TimezoneMode::Zone(id) => id,
            TimezoneMode::VenueLocal => VENUE_LOCAL.to_owned(),
        }
    }
}

impl TimezoneMode {
    pub fn detect() -> Self {
        TimezoneMode::Zone(detect_timezone())
    }

    pub fn is_venue_local(&self) -> bool {
        matches!(self, TimezoneMode::VenueLocal)
    }

    pub fn offset_for(&self, venue: Option<&Venue>) -> FixedOffset {
        match self {
            TimezoneMode::Zone(id) => zone_offset(id),
            TimezoneMode::VenueLocal => zone_offset(venue.map(|v| v.timezone.as_str()).unwrap_or("UTC")),
        }
    }

    /// Picker order: venue-local, then every listed zone, then back round.
    pub fn cycle(&self) -> Self {
        let next = match self {
            TimezoneMode::VenueLocal => ZONES.first(),
            TimezoneMode::Zone(id) => match ZONES.iter().position(|z| z.id == id) {
                Some(i) => ZONES.get(i + 1),
                None => ZONES.first(),
            },
        };
        next.map(|z| TimezoneMode::Zone(z.id.to_owned()))
            .unwrap_or(TimezoneMode::VenueLocal)
    }

    pub fn label(&self) -> String {
        match self {
            TimezoneMode::VenueLocal => "Venue local time".to_owned(),
            TimezoneMode::Zone(id) => zone_info(id).map(|z| z.label.to_owned()).unwrap_or_else(|| id.clone()),
        }
    }

    pub fn abbr(&self) -> String {
        match self {
            TimezoneMode::VenueLocal => "Local".to_owned(),
            TimezoneMode::Zone(id) => zone_info(id).map(|z| z.abbr.to_owned()).unwrap_or_else(|| id.clone()),
        }
    }
}

pub fn local_kickoff(kickoff: DateTime<Utc>, mode: &TimezoneMode, venue: Option<&Venue>) -> DateTime<FixedOffset> {
    kickoff.with_timezone(&mode.offset_for(venue))
}

/// "20:00"
pub fn format_match_time(kickoff: DateTime<Utc>, mode: &TimezoneMode, venue: Option<&Venue>) -> String {
    local_kickoff(kickoff, mode, venue).format("%H:%M").to_string()
}

/// "Sat 13 Jun", the local calendar day of the kickoff.
pub fn format_match_date(kickoff: DateTime<Utc>, mode: &TimezoneMode, venue: Option<&Venue>) -> String {
    local_kickoff(kickoff, mode, venue).format("%a %-d %b").to_string()
}

/// "Sat 13 Jun 2026, 20:00"
pub fn format_full_date(kickoff: DateTime<Utc>, mode: &TimezoneMode, venue: Option<&Venue>) -> String {
    local_kickoff(kickoff, mode, venue)
        .format("%a %-d %b %Y, %H:%M")
        .to_string()
}
