//! calex — calendar-event extraction from natural-language text.
//!
//! Given a snippet like `"tomorrow 5pm meeting with jack in conference
//! room A"` and a [`ReferenceContext`] describing the caller's "now", the
//! extractor produces a structured [`EventCandidate`] (title, start,
//! optional end, location) by running a fixed-precedence list of matchers
//! over the text:
//!
//! ```text
//! relative offsets ("in 30 minutes", "soon")
//!   > day word + clock ("tomorrow 5pm", "friday at noon")
//!   > clock ranges ("2-3pm", "from 2 to 4pm")
//!   > single clock time ("at 5pm", "17:00")
//!   > all-day markers ("all day")
//!   > 18:00 default on the resolved date
//! ```
//!
//! The first matcher that fires wins; within a matcher the leftmost
//! occurrence wins. Location and title extraction run afterwards on the
//! spans the time matchers did not consume. The whole pipeline is pure
//! and deterministic: the same text and context always produce the same
//! candidate.
//!
//! An optional language-model fallback ([`extract_with_oracle`]) is
//! consulted only when no explicit time expression matched, and its reply
//! is validated against the same candidate invariants before acceptance.
//!
//! The [`server`] module exposes the extractor over HTTP (`POST /parse`);
//! the [`calendar`] module holds the downstream calendar-API payloads and
//! the prefilled review-link builder.

extern crate self as calex;

use chrono::{NaiveDateTime, NaiveTime};

#[macro_use]
mod macros;

mod candidate;
mod context;
mod engine;
mod error;
mod oracle;
mod rules;

pub mod calendar;
pub mod server;

pub use candidate::{EventCandidate, UNTITLED_EVENT};
pub use context::{DEFAULT_TIMEZONE, ReferenceContext};
pub use engine::extract;
pub use error::ExtractError;
pub use oracle::{Oracle, OpenAiOracle, extract_with_oracle};

// --- Internal match types ---------------------------------------------------

/// A consumed byte range of the original input (start inclusive, end
/// exclusive). Always aligned to char boundaries since it comes from
/// regex matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn of(m: &regex::Match<'_>) -> Self {
        Span { start: m.start(), end: m.end() }
    }
}

/// A matched day phrase ("today", "tomorrow", a weekday name).
///
/// `implied` carries a clock time the phrase suggests when no explicit
/// clock is present ("tonight" implies the evening), without overriding
/// an explicit one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DayMatch {
    pub span: Span,
    pub date: chrono::NaiveDate,
    pub implied: Option<NaiveTime>,
}

/// A matched relative offset from the reference instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RelativeMatch {
    pub span: Span,
    pub start: NaiveDateTime,
}

/// A matched explicit clock range on a single day.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RangeMatch {
    pub span: Span,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A matched single clock time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClockMatch {
    pub span: Span,
    pub time: NaiveTime,
}

/// A matched trailing duration clause ("for 30 minutes").
#[derive(Debug, Clone, Copy)]
pub(crate) struct DurationMatch {
    pub span: Span,
    pub seconds: i64,
}

/// A matched location phrase.
#[derive(Debug, Clone)]
pub(crate) struct LocationMatch {
    pub span: Span,
    pub text: String,
}

/// Build a `NaiveTime` from hour/minute, falling back to midnight for
/// out-of-range input (matchers validate before calling).
pub(crate) fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
