//! Downstream calendar contracts.
//!
//! Two consumption modes for a candidate, both using its fields
//! verbatim: the calendar API's event-insert payload, and a prefilled
//! "review" link the user can open to confirm the event by hand.
//! Duration defaulting for an absent end (one hour timed, one civil day
//! all-day) happens here, at the boundary, not in the extractor.

use chrono::{Duration, NaiveDateTime};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use crate::candidate::{EventCandidate, format_datetime};

/// Default duration in minutes for timed events with no stated end.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

const RENDER_URL: &str = "https://calendar.google.com/calendar/render";

// encodeURIComponent's unreserved set.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One side of an event-insert payload: either a civil date (all-day) or
/// a wall-clock datetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventDateTime {
    Date {
        date: String,
    },
    DateTime {
        #[serde(rename = "dateTime")]
        date_time: String,
    },
}

/// The calendar API's event-insert body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInsert {
    pub summary: String,
    pub location: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventInsert {
    /// Build an insert payload from a candidate.
    pub fn from_candidate(candidate: &EventCandidate, all_day: bool) -> Self {
        let end = candidate.end.unwrap_or_else(|| default_end(candidate.start, all_day));
        let (start, end) = if all_day {
            (
                EventDateTime::Date { date: candidate.start.date().to_string() },
                EventDateTime::Date { date: end.date().to_string() },
            )
        } else {
            (
                EventDateTime::DateTime { date_time: format_datetime(&candidate.start) },
                EventDateTime::DateTime { date_time: format_datetime(&end) },
            )
        };
        EventInsert { summary: candidate.title.clone(), location: candidate.location.clone(), start, end }
    }
}

/// Prefilled calendar-render link for review mode. Timestamps use the
/// UTC basic format: `YYYYMMDDTHHMMSSZ` for timed events, `YYYYMMDD`
/// for all-day ones.
pub fn review_link(candidate: &EventCandidate, all_day: bool, calendar_id: Option<&str>) -> String {
    let end = candidate.end.unwrap_or_else(|| default_end(candidate.start, all_day));
    let (start_stamp, end_stamp) = if all_day {
        (candidate.start.format("%Y%m%d").to_string(), end.format("%Y%m%d").to_string())
    } else {
        (candidate.start.format("%Y%m%dT%H%M%SZ").to_string(), end.format("%Y%m%dT%H%M%SZ").to_string())
    };

    let mut url = format!(
        "{RENDER_URL}?action=TEMPLATE&text={}&dates={}/{}&location={}",
        utf8_percent_encode(&candidate.title, QUERY),
        start_stamp,
        end_stamp,
        utf8_percent_encode(&candidate.location, QUERY),
    );
    if let Some(id) = calendar_id {
        url.push_str("&src=");
        url.push_str(&utf8_percent_encode(id, QUERY).to_string());
    }
    url
}

fn default_end(start: NaiveDateTime, all_day: bool) -> NaiveDateTime {
    if all_day {
        // Exclusive end date, one civil day later.
        start.date().succ_opt().map(|d| d.and_time(start.time())).unwrap_or(start)
    } else {
        start + Duration::minutes(DEFAULT_EVENT_MINUTES)
    }
}
