//! Day phrases: "today", "tonight", "tomorrow", weekday names.
//!
//! Weekdays resolve to the next occurrence strictly after `today` —
//! never today itself unless the text says "today". Substitution never
//! adds days beyond what the text licenses: "tomorrow" is exactly
//! `ctx.tomorrow`, already computed by civil-date increment.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::context::ReferenceContext;
use crate::{DayMatch, Span, hm};

/// "tonight" implies this clock time when no explicit one is present.
pub const TONIGHT_HOUR: u32 = 20;

/// Find the leftmost day phrase, if any.
pub(crate) fn find(text: &str, ctx: &ReferenceContext) -> Option<DayMatch> {
    let re = regex!(
        r"(?i)\b(?:(today)|(tonight)|(tomorrow|tmrw)|(?:(?:next|this)\s+)?(monday|mon|tuesday|tues|tue|wednesday|weds|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun))\b"
    );
    let caps = re.captures(text)?;
    let span = Span::of(&caps.get(0)?);

    if caps.get(1).is_some() {
        return Some(DayMatch { span, date: ctx.today, implied: None });
    }
    if caps.get(2).is_some() {
        return Some(DayMatch { span, date: ctx.today, implied: Some(hm(TONIGHT_HOUR, 0)) });
    }
    if caps.get(3).is_some() {
        return Some(DayMatch { span, date: ctx.tomorrow, implied: None });
    }

    let weekday = parse_weekday(caps.get(4)?.as_str())?;
    Some(DayMatch { span, date: next_occurrence_after(ctx.today, weekday), implied: None })
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tues" | "tue" => Some(Weekday::Tue),
        "wednesday" | "weds" | "wed" => Some(Weekday::Wed),
        "thursday" | "thurs" | "thur" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next `target` weekday strictly after `today`; same weekday means a
/// full week ahead.
fn next_occurrence_after(today: NaiveDate, target: Weekday) -> NaiveDate {
    let mut ahead = (target.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(ahead)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReferenceContext {
        // 2025-01-06 is a Monday.
        let now = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(9, 0, 0).unwrap();
        ReferenceContext::at(now, "UTC").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_resolves_to_today() {
        let m = find("today 5pm", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 6));
    }

    #[test]
    fn tomorrow_resolves_to_exactly_one_day_ahead() {
        let m = find("tomorrow 5pm meeting", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 7));
    }

    #[test]
    fn weekday_resolves_to_next_occurrence() {
        let m = find("lunch on friday", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 10));
    }

    #[test]
    fn same_weekday_rolls_a_full_week() {
        // Reference is a Monday; "monday" must not resolve to today.
        let m = find("review on monday", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 13));
    }

    #[test]
    fn next_weekday_matches_bare_weekday() {
        let m = find("next tuesday standup", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 7));
    }

    #[test]
    fn tonight_implies_evening() {
        let m = find("drinks tonight", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 6));
        assert_eq!(m.implied, Some(hm(TONIGHT_HOUR, 0)));
    }

    #[test]
    fn leftmost_day_phrase_wins() {
        let m = find("today, not tomorrow", &ctx()).unwrap();
        assert_eq!(m.date, date(2025, 1, 6));
    }

    #[test]
    fn no_day_phrase() {
        assert!(find("lunch at noon", &ctx()).is_none());
    }
}
