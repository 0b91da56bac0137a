//! Extraction pipeline.
//!
//! One pass per call: resolve the date from a day phrase (default
//! `today`), resolve the time of day through the precedence list, then
//! extract location and title from whatever the time matchers did not
//! consume. Pure and synchronous; every call gets its own context and
//! shares nothing.

use chrono::NaiveDateTime;

use crate::candidate::{EventCandidate, UNTITLED_EVENT};
use crate::context::ReferenceContext;
use crate::error::ExtractError;
use crate::{Span, hm, rules};

/// Events with a date but no stated clock time start here.
pub const DEFAULT_START_HOUR: u32 = 18;

/// All-day events end at this wall-clock time.
pub const ALL_DAY_END: (u32, u32) = (23, 59);

/// Extract an event candidate from `text`, resolving every relative or
/// ambiguous phrase against `ctx`. Deterministic: ambiguity is resolved
/// by the precedence rules, never reported as an error; only genuinely
/// empty input fails.
pub fn extract(text: &str, ctx: &ReferenceContext) -> Result<EventCandidate, ExtractError> {
    Ok(extract_inner(text, ctx)?.candidate)
}

/// An extraction plus whether any explicit time expression matched
/// (false means the 18:00 default supplied the start). The oracle
/// fallback keys off this.
pub(crate) struct Extraction {
    pub candidate: EventCandidate,
    pub explicit_time: bool,
}

pub(crate) fn extract_inner(text: &str, ctx: &ReferenceContext) -> Result<Extraction, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let day = rules::day_words::find(text, ctx);
    let date = day.map(|d| d.date).unwrap_or(ctx.today);

    let mut spans: Vec<Span> = Vec::new();
    if let Some(d) = &day {
        spans.push(d.span);
    }

    let mut explicit_time = day.is_some();
    let start: NaiveDateTime;
    let mut end: Option<NaiveDateTime> = None;

    if let Some(rel) = rules::relative::find(text, ctx) {
        tracing::debug!(rule = "relative", start = %rel.start, "time resolved");
        start = rel.start;
        spans.push(rel.span);
        explicit_time = true;
        apply_duration(text, start, &mut end, &mut spans);
    } else if let Some(range) = rules::ranges::find(text) {
        tracing::debug!(rule = "range", "time resolved");
        start = date.and_time(range.start);
        end = Some(date.and_time(range.end));
        spans.push(range.span);
        explicit_time = true;
    } else if let Some(clock) = rules::clock::find(text, ctx) {
        tracing::debug!(rule = "clock", "time resolved");
        start = date.and_time(clock.time);
        spans.push(clock.span);
        explicit_time = true;
        apply_duration(text, start, &mut end, &mut spans);
    } else if let Some(span) = rules::all_day::find(text) {
        tracing::debug!(rule = "all_day", "time resolved");
        start = date.and_time(hm(0, 0));
        end = Some(date.and_time(hm(ALL_DAY_END.0, ALL_DAY_END.1)));
        spans.push(span);
        explicit_time = true;
    } else {
        let time = day.and_then(|d| d.implied).unwrap_or(hm(DEFAULT_START_HOUR, 0));
        tracing::debug!(rule = "default", %time, "no clock time in text");
        start = date.and_time(time);
        apply_duration(text, start, &mut end, &mut spans);
    }

    let masked = mask_spans(text, &spans);
    let location = match rules::location::find(&masked, text) {
        Some(found) => {
            spans.push(found.span);
            found.text
        }
        None => String::new(),
    };

    let title = build_title(text, &mut spans);

    Ok(Extraction { candidate: EventCandidate { title, start, end, location }, explicit_time })
}

fn apply_duration(text: &str, start: NaiveDateTime, end: &mut Option<NaiveDateTime>, spans: &mut Vec<Span>) {
    if let Some(dur) = rules::relative::find_duration(text) {
        let finish = chrono::Duration::try_seconds(dur.seconds).and_then(|d| start.checked_add_signed(d));
        match finish {
            Some(finish) => {
                *end = Some(finish);
                spans.push(dur.span);
            }
            None => tracing::debug!(seconds = dur.seconds, "duration clause overflows the calendar; ignored"),
        }
    }
}

/// Blank out consumed spans so later matchers cannot re-match them.
/// NUL keeps byte offsets stable and is treated as a hard boundary by
/// the location scanner.
fn mask_spans(text: &str, spans: &[Span]) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for span in spans {
        for b in &mut bytes[span.start..span.end] {
            *b = 0;
        }
    }
    String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
}

/// Connectors dropped from the tail of a title once spans are removed
/// ("lunch at" after its location is gone, "standup on" after "zoom").
const DANGLING_WORDS: &[&str] = &["at", "in", "on", "by", "near", "from", "to", "for", "until", "till"];

/// The original text minus every consumed span, whitespace collapsed.
fn build_title(text: &str, spans: &mut Vec<Span>) -> String {
    spans.sort_by_key(|s| (s.start, s.end));

    let mut remainder = String::new();
    let mut pos = 0;
    for span in spans.iter() {
        if span.start > pos {
            remainder.push_str(&text[pos..span.start]);
            remainder.push(' ');
        }
        pos = pos.max(span.end);
    }
    if pos < text.len() {
        remainder.push_str(&text[pos..]);
    }

    let flattened = remainder.replace(['\n', '\r'], " ");
    let collapsed = regex!(r"\s+").replace_all(&flattened, " ");
    let trimmed = collapsed.trim().trim_matches(|c: char| ",.;:-–—".contains(c)).trim().to_string();
    let title = trim_dangling(&trimmed);

    if title.is_empty() { UNTITLED_EVENT.to_string() } else { title }
}

fn trim_dangling(title: &str) -> String {
    let mut words: Vec<&str> = title.split_whitespace().collect();
    while let Some(last) = words.last() {
        let bare = last.trim_matches(|c: char| ",.;:".contains(c)).to_lowercase();
        if DANGLING_WORDS.contains(&bare.as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}
