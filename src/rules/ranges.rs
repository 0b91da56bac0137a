//! Explicit clock ranges: "2-3pm", "9:30-11am", "from 2 to 4pm",
//! "between 9 and 11am", "10:30 until 12:00".
//!
//! A meridiem stated on one side is inherited by the other. When a range
//! crosses a 12-hour boundary ambiguously ("11-1"), the interpretation
//! with `end > start` is preferred, rolling the end into PM if needed.

use chrono::NaiveTime;

use crate::rules::clock::{Meridiem, parse_meridiem, to_24h};
use crate::{RangeMatch, Span, hm};

/// Find the leftmost resolvable clock range, if any. Later ranges in the
/// text are ignored.
pub(crate) fn find(text: &str) -> Option<RangeMatch> {
    let between = regex!(
        r"(?i)\bbetween\s+(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)?\s+and\s+(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)?\b"
    );
    let dash = regex!(
        r"(?i)\b(?:from\s+)?(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)?\s*(?:-|–|—|to|until|till)\s*(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)?\b"
    );

    let mut best: Option<RangeMatch> = None;
    for re in [between, dash] {
        for caps in re.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if best.as_ref().map(|b| m.start() >= b.span.start).unwrap_or(false) {
                break;
            }
            let Some(parsed) = resolve(
                caps.get(1).map(|g| g.as_str()),
                caps.get(2).map(|g| g.as_str()),
                caps.get(3).map(|g| g.as_str()),
                caps.get(4).map(|g| g.as_str()),
                caps.get(5).map(|g| g.as_str()),
                caps.get(6).map(|g| g.as_str()),
            ) else {
                continue;
            };
            best = Some(RangeMatch { span: Span::of(&m), start: parsed.0, end: parsed.1 });
            break;
        }
    }
    best
}

fn resolve(
    h1: Option<&str>,
    m1: Option<&str>,
    mer1: Option<&str>,
    h2: Option<&str>,
    m2: Option<&str>,
    mer2: Option<&str>,
) -> Option<(NaiveTime, NaiveTime)> {
    let explicit_minutes = m1.is_some() || m2.is_some();
    let h1: u32 = h1?.parse().ok()?;
    let h2: u32 = h2?.parse().ok()?;
    let m1: u32 = m1.unwrap_or("0").parse().ok()?;
    let m2: u32 = m2.unwrap_or("0").parse().ok()?;
    if h1 > 23 || h2 > 23 || m1 > 59 || m2 > 59 {
        return None;
    }
    let mer1 = mer1.and_then(parse_meridiem);
    let mer2 = mer2.and_then(parse_meridiem);

    // Without any meridiem or written minutes, only accept
    // 12-hour-looking pairs ("11-1"); bare 24-hour pairs are too easy to
    // confuse with prose.
    if mer1.is_none() && mer2.is_none() && !explicit_minutes && !((1..=12).contains(&h1) && (1..=12).contains(&h2)) {
        return None;
    }
    if mer1.is_some() && !(1..=12).contains(&h1) {
        return None;
    }
    if mer2.is_some() && !(1..=12).contains(&h2) {
        return None;
    }

    // A one-sided meridiem is inherited by the other side.
    let mut start = to_24h(h1, mer1.or(mer2).filter(|_| (1..=12).contains(&h1)));
    let mut end = to_24h(h2, mer2.or(mer1).filter(|_| (1..=12).contains(&h2)));

    // Prefer the reading where the range moves forward.
    if minutes(end, m2) <= minutes(start, m1) && mer1.is_none() && start >= 12 {
        tracing::debug!(h1, h2, "rolled range start back to AM to keep end after start");
        start -= 12;
    }
    if minutes(end, m2) <= minutes(start, m1) && mer2.is_none() && end + 12 <= 23 {
        tracing::debug!(h1, h2, "rolled range end to PM to keep end after start");
        end += 12;
    }
    if minutes(end, m2) <= minutes(start, m1) {
        return None;
    }

    Some((hm(start, m1), hm(end, m2)))
}

fn minutes(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}
