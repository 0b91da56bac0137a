//! The structured result of extraction.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Title used when nothing remains of the text once date/time/location
/// spans are removed.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// A parsed event, prior to any calendar submission.
///
/// Timestamps are civil datetimes in the caller's frame, serialized as
/// offset-free ISO-8601 (`2025-01-07T17:00:00`); the caller's timezone
/// label travels separately in the [`crate::ReferenceContext`].
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCandidate {
    /// Non-empty display title, free of the extracted date/time/location
    /// substrings.
    pub title: String,
    /// Event start; always present.
    #[serde(rename = "startTime", serialize_with = "ser_datetime")]
    pub start: NaiveDateTime,
    /// Event end. `None` means the text stated no explicit duration;
    /// downstream defaulting is the consumer's business, not ours.
    #[serde(rename = "endTime", serialize_with = "ser_opt_datetime")]
    pub end: Option<NaiveDateTime>,
    /// Extracted location; empty string when none was found, never null.
    pub location: String,
}

impl EventCandidate {
    /// Check the candidate invariants: a non-blank title and, when an
    /// end is present, `end > start`. Used to vet oracle replies before
    /// they are accepted.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if let Some(end) = self.end {
            if end <= self.start {
                return Err(format!("end {end} is not after start {}", self.start));
            }
        }
        Ok(())
    }
}

/// ISO-8601 without offset, the shape the original backend emits.
pub(crate) fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Parse a datetime string leniently: offset-free ISO, fractional
/// seconds, RFC 3339 with offset (normalized to its UTC wall clock), or
/// a bare date (midnight). Oracle replies use whichever they like.
pub(crate) fn parse_datetime_flex(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

fn ser_datetime<S: Serializer>(dt: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&format_datetime(dt))
}

fn ser_opt_datetime<S: Serializer>(dt: &Option<NaiveDateTime>, ser: S) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => ser.serialize_str(&format_datetime(dt)),
        None => ser.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn serializes_with_original_backend_field_names() {
        let candidate = EventCandidate {
            title: "meeting with jack".to_string(),
            start: dt(7, 17, 0),
            end: None,
            location: String::new(),
        };
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "meeting with jack",
                "startTime": "2025-01-07T17:00:00",
                "endTime": null,
                "location": "",
            })
        );
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let candidate = EventCandidate {
            title: "call".to_string(),
            start: dt(7, 15, 0),
            end: Some(dt(7, 14, 0)),
            location: String::new(),
        };
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_title() {
        let candidate =
            EventCandidate { title: "  ".to_string(), start: dt(7, 15, 0), end: None, location: String::new() };
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn parse_datetime_flex_accepts_common_shapes() {
        assert_eq!(parse_datetime_flex("2025-01-07T17:00:00"), Some(dt(7, 17, 0)));
        assert_eq!(parse_datetime_flex("2025-01-07T17:00:00.000Z"), Some(dt(7, 17, 0)));
        assert_eq!(parse_datetime_flex("2025-01-07T17:00"), Some(dt(7, 17, 0)));
        assert_eq!(parse_datetime_flex("2025-01-07"), Some(dt(7, 0, 0)));
        assert_eq!(parse_datetime_flex("not a date"), None);
    }
}
