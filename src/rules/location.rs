//! Location extraction.
//!
//! Prepositional phrases ("at X", "in X", "near X", "by X") are scanned
//! word by word, bounded by a stoplist of temporal and connector words,
//! a sentence terminator, or a span another matcher already consumed
//! (the engine masks those with NULs before calling in). Virtual-meeting
//! keywords count as locations even without a preposition. First match
//! wins.

use crate::{LocationMatch, Span};

/// Longest location phrase we will accept, in bytes.
const MAX_LOCATION_LEN: usize = 50;

/// Words that terminate a location phrase.
const STOP_WORDS: &[&str] = &[
    "on", "at", "by", "in", "near", "next", "this", "that", "with", "and", "then", "from", "to", "until", "till",
    "for", "today", "tomorrow", "tonight", "tmrw", "am", "pm", "noon", "midnight", "morning", "afternoon", "evening",
    "night", "soon", "now", "all", "every", "monday", "mon", "tuesday", "tues", "tue", "wednesday", "weds", "wed",
    "thursday", "thurs", "thur", "thu", "friday", "fri", "saturday", "sat", "sunday", "sun",
];

/// Find a location in `masked` (the input with already-consumed spans
/// NUL-ed out), returning text sliced from `original` so casing and
/// accents survive.
pub(crate) fn find(masked: &str, original: &str) -> Option<LocationMatch> {
    if let Some(found) = prepositional(masked, original) {
        return Some(found);
    }
    virtual_keyword(masked, original)
}

fn prepositional(masked: &str, original: &str) -> Option<LocationMatch> {
    let prep = regex!(r"(?i)\b(?:at|in|near|by)\s+");
    for m in prep.find_iter(masked) {
        let after = &masked[m.end()..];
        // Stop at sentence terminators and masked regions alike.
        let segment_end = after.find(['\0', '.', '\n', '\r', '!', '?', ';', ':']).unwrap_or(after.len());
        let segment = &after[..segment_end];

        let Some(len) = accept_words(segment) else { continue };
        let span = Span { start: m.start(), end: m.end() + len };
        let text = original[m.end()..m.end() + len].trim().trim_matches(',').to_string();
        if text.is_empty() {
            continue;
        }
        return Some(LocationMatch { span, text });
    }
    None
}

/// Walk words of `segment`, returning the byte length of the accepted
/// location phrase, or `None` when the phrase is empty or starts with
/// something that cannot open a location (a bare number, a stop word).
fn accept_words(segment: &str) -> Option<usize> {
    let word = regex!(r"\S+");
    let mut end = 0;
    let mut count = 0;
    for m in word.find_iter(segment) {
        let raw = m.as_str().trim_matches(|c: char| c == ',' || c == '"' || c == '\'');
        let lower = raw.to_lowercase();
        if raw.is_empty() || STOP_WORDS.contains(&lower.as_str()) {
            break;
        }
        if count == 0 && raw.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if m.end() > MAX_LOCATION_LEN {
            break;
        }
        end = m.end();
        count += 1;
    }
    (count > 0).then_some(end)
}

fn virtual_keyword(masked: &str, original: &str) -> Option<LocationMatch> {
    let re = regex!(r"(?i)\b(?:zoom|microsoft\s+teams|teams|google\s+meet|webex|online|virtual)\b");
    let m = re.find(masked)?;
    let span = Span::of(&m);
    tracing::debug!(keyword = &original[span.start..span.end], "virtual-meeting keyword taken as location");
    Some(LocationMatch { span, text: original[span.start..span.end].to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(text: &str) -> Option<String> {
        find(text, text).map(|m| m.text)
    }

    #[test]
    fn at_business_name() {
        assert_eq!(loc("lunch at café rio"), Some("café rio".to_string()));
    }

    #[test]
    fn in_room_with_trailing_identifier() {
        assert_eq!(loc("presentation in conference room A"), Some("conference room A".to_string()));
    }

    #[test]
    fn stops_at_temporal_words() {
        assert_eq!(loc("dinner at luigi's tomorrow"), Some("luigi's".to_string()));
        assert_eq!(loc("dinner at luigi's on friday"), Some("luigi's".to_string()));
    }

    #[test]
    fn stops_at_connector_words() {
        assert_eq!(loc("dinner at luigi's with sara"), Some("luigi's".to_string()));
    }

    #[test]
    fn first_preposition_wins() {
        assert_eq!(loc("meet at the office near the station"), Some("the office".to_string()));
    }

    #[test]
    fn bare_number_is_not_a_location() {
        assert_eq!(loc("see you in 5"), None);
    }

    #[test]
    fn masked_spans_are_skipped() {
        // Engine masks "at 5pm" before asking for a location.
        let original = "lunch at 5pm at the deli";
        let masked = "lunch \0\0\0\0\0\0 at the deli";
        assert_eq!(find(masked, original).map(|m| m.text), Some("the deli".to_string()));
    }

    #[test]
    fn virtual_keyword_without_preposition() {
        assert_eq!(loc("standup on zoom"), Some("zoom".to_string()));
        assert_eq!(loc("review call, online"), Some("online".to_string()));
    }

    #[test]
    fn no_location() {
        assert_eq!(loc("team dinner tomorrow"), None);
    }
}
