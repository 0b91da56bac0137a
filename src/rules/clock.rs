//! Single clock times: "5pm", "at 17:00", "noon", "tomorrow morning".
//!
//! Also home to the meridiem helpers the range matcher shares.

use chrono::{NaiveTime, Timelike};

use crate::context::ReferenceContext;
use crate::{ClockMatch, Span, hm};

/// Clock times implied by part-of-day words.
pub const MORNING_HOUR: u32 = 9;
pub const AFTERNOON_HOUR: u32 = 14;
pub const EVENING_HOUR: u32 = 18;
pub const NIGHT_HOUR: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Meridiem {
    Am,
    Pm,
}

pub(crate) fn parse_meridiem(s: &str) -> Option<Meridiem> {
    match s.to_ascii_lowercase().replace('.', "").as_str() {
        "am" => Some(Meridiem::Am),
        "pm" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// Apply a meridiem to a 12-hour clock hour. Without one, the hour is
/// taken as written (24-hour reading).
pub(crate) fn to_24h(hour: u32, meridiem: Option<Meridiem>) -> u32 {
    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        _ => hour,
    }
}

/// Find the leftmost single clock time, if any. Ties on position go to
/// the more explicit form.
pub(crate) fn find(text: &str, ctx: &ReferenceContext) -> Option<ClockMatch> {
    let mut best: Option<(Span, usize, NaiveTime)> = None;

    let mut consider = |span: Span, priority: usize, time: NaiveTime| {
        let better = match best {
            Some((b, p, _)) => (span.start, priority) < (b.start, p),
            None => true,
        };
        if better {
            best = Some((span, priority, time));
        }
    };

    // "at 5:30pm", "17:00"
    let colon = regex!(r"(?i)\b(?:at\s+)?(\d{1,2}):(\d{2})\s*(a\.?m\.?|p\.?m\.?)?\b");
    for caps in colon.captures_iter(text) {
        let (Some(m), Some(h), Some(min)) = (caps.get(0), caps.get(1), caps.get(2)) else { continue };
        let meridiem = caps.get(3).and_then(|g| parse_meridiem(g.as_str()));
        let Some(time) = clock_time(h.as_str(), min.as_str(), meridiem) else { continue };
        consider(Span::of(&m), 0, time);
        break;
    }

    // "5pm", "at 11 am"
    let with_meridiem = regex!(r"(?i)\b(?:at\s+)?(\d{1,2})\s*(a\.?m\.?|p\.?m\.?)\b");
    for caps in with_meridiem.captures_iter(text) {
        let (Some(m), Some(h)) = (caps.get(0), caps.get(1)) else { continue };
        let meridiem = parse_meridiem(caps.get(2).map(|g| g.as_str()).unwrap_or(""));
        let Some(time) = clock_time(h.as_str(), "0", meridiem) else { continue };
        consider(Span::of(&m), 1, time);
        break;
    }

    // Bare "at 5": no meridiem stated, so pick one from the reference
    // clock — daytime reference reads it as PM, otherwise AM.
    let at_bare = regex!(r"(?i)\bat\s+(\d{1,2})\b");
    for caps in at_bare.captures_iter(text) {
        let (Some(m), Some(h)) = (caps.get(0), caps.get(1)) else { continue };
        // "at 5:75" is a (rejected) colon form, not a bare hour.
        if text[m.end()..].starts_with(':') {
            continue;
        }
        let Some(hour) = h.as_str().parse::<u32>().ok().filter(|h| *h <= 23) else { continue };
        let resolved = if (1..=11).contains(&hour) && (6..18).contains(&ctx.now.hour()) { hour + 12 } else { hour };
        if resolved != hour {
            tracing::debug!(hour, resolved, "ambiguous bare hour read as PM");
        }
        consider(Span::of(&m), 2, hm(resolved, 0));
        break;
    }

    let named = regex!(r"(?i)\b(noon|midday|midnight)\b");
    if let Some(caps) = named.captures(text) {
        if let (Some(m), Some(word)) = (caps.get(0), caps.get(1)) {
            let time = if word.as_str().eq_ignore_ascii_case("midnight") { hm(0, 0) } else { hm(12, 0) };
            consider(Span::of(&m), 3, time);
        }
    }

    let part_of_day = regex!(r"(?i)\b(morning|afternoon|evening|night)\b");
    if let Some(caps) = part_of_day.captures(text) {
        if let (Some(m), Some(word)) = (caps.get(0), caps.get(1)) {
            let hour = match word.as_str().to_ascii_lowercase().as_str() {
                "morning" => MORNING_HOUR,
                "afternoon" => AFTERNOON_HOUR,
                "evening" => EVENING_HOUR,
                _ => NIGHT_HOUR,
            };
            consider(Span::of(&m), 4, hm(hour, 0));
        }
    }

    best.map(|(span, _, time)| ClockMatch { span, time })
}

fn clock_time(hour: &str, minute: &str, meridiem: Option<Meridiem>) -> Option<NaiveTime> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if minute > 59 {
        return None;
    }
    if meridiem.is_some() && !(1..=12).contains(&hour) {
        return None;
    }
    let hour = to_24h(hour, meridiem);
    (hour <= 23).then(|| hm(hour, minute))
}
