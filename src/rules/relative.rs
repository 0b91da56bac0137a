//! Relative-time expressions: "in 30 minutes", "in an hour", "right
//! now", "soon", and trailing duration clauses ("... for 30 minutes").
//!
//! These resolve by adding an offset to the reference `now` exactly, so
//! seconds carried by `now` survive into the result. The canonical
//! offsets for the vague phrases are fixed constants, not inferred.

use chrono::Duration;

use crate::context::ReferenceContext;
use crate::{DurationMatch, RelativeMatch, Span};

/// "soon" means this many minutes from now.
pub const SOON_OFFSET_MINUTES: i64 = 30;
/// Bare "in an hour" means exactly this many minutes from now.
pub const AN_HOUR_MINUTES: i64 = 60;

/// Find the leftmost relative-time expression, if any.
pub(crate) fn find(text: &str, ctx: &ReferenceContext) -> Option<RelativeMatch> {
    let mut best: Option<(Span, i64)> = None;

    let mut consider = |span: Span, seconds: i64| {
        if best.map(|(b, _)| span.start < b.start).unwrap_or(true) {
            best = Some((span, seconds));
        }
    };

    let in_amount = regex!(r"(?i)\bin\s+(\d+(?:\.\d+)?)\s*(hours?|hrs?|hr|minutes?|mins?|min)\b");
    if let Some(caps) = in_amount.captures(text) {
        let m = caps.get(0)?;
        if let Some(seconds) = amount_seconds(caps.get(1)?.as_str(), caps.get(2)?.as_str()) {
            consider(Span::of(&m), seconds);
        }
    }

    let in_article = regex!(r"(?i)\bin\s+(?:an?\s+(hour|minute)|(half\s+an\s+hour))\b");
    if let Some(caps) = in_article.captures(text) {
        let m = caps.get(0)?;
        let seconds = if caps.get(2).is_some() {
            30 * 60
        } else if caps.get(1)?.as_str().eq_ignore_ascii_case("hour") {
            AN_HOUR_MINUTES * 60
        } else {
            60
        };
        consider(Span::of(&m), seconds);
    }

    if let Some(m) = regex!(r"(?i)\bright\s+now\b").find(text) {
        consider(Span::of(&m), 0);
    }

    if let Some(m) = regex!(r"(?i)\bsoon\b").find(text) {
        consider(Span::of(&m), SOON_OFFSET_MINUTES * 60);
    }

    let (span, seconds) = best?;
    // Offsets past the calendar's edge are unresolvable, not a panic.
    let start = Duration::try_seconds(seconds).and_then(|d| ctx.now.checked_add_signed(d))?;
    Some(RelativeMatch { span, start })
}

/// Find a trailing duration clause ("for 30 minutes", "for an hour").
/// Sets the end of an event whose start came from another matcher.
pub(crate) fn find_duration(text: &str) -> Option<DurationMatch> {
    let re = regex!(
        r"(?i)\bfor\s+(?:(\d+(?:\.\d+)?)\s*(hours?|hrs?|hr|minutes?|mins?|min)|an?\s+(hour|minute)|(half\s+an\s+hour))\b"
    );
    let caps = re.captures(text)?;
    let m = caps.get(0)?;
    let seconds = if let (Some(amount), Some(unit)) = (caps.get(1), caps.get(2)) {
        amount_seconds(amount.as_str(), unit.as_str())?
    } else if caps.get(4).is_some() {
        30 * 60
    } else if caps.get(3)?.as_str().eq_ignore_ascii_case("hour") {
        3600
    } else {
        60
    };
    if seconds <= 0 {
        return None;
    }
    Some(DurationMatch { span: Span::of(&m), seconds })
}

fn amount_seconds(amount: &str, unit: &str) -> Option<i64> {
    let amount: f64 = amount.parse().ok()?;
    let per_unit = if unit.to_ascii_lowercase().starts_with('h') { 3600.0 } else { 60.0 };
    let seconds = (amount * per_unit).round() as i64;
    (seconds >= 0).then_some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> ReferenceContext {
        let now = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(9, 15, 42).unwrap();
        ReferenceContext::at(now, "UTC").unwrap()
    }

    #[test]
    fn in_n_minutes_is_exact_from_now() {
        let ctx = ctx();
        let m = find("lunch in 30 minutes", &ctx).unwrap();
        assert_eq!(m.start, ctx.now + Duration::minutes(30));
    }

    #[test]
    fn in_n_hours() {
        let ctx = ctx();
        let m = find("call in 2 hours", &ctx).unwrap();
        assert_eq!(m.start, ctx.now + Duration::hours(2));
    }

    #[test]
    fn in_decimal_hours_rounds_to_seconds() {
        let ctx = ctx();
        let m = find("in 1.5 hours", &ctx).unwrap();
        assert_eq!(m.start, ctx.now + Duration::minutes(90));
    }

    #[test]
    fn in_an_hour_is_the_canonical_sixty() {
        let ctx = ctx();
        let m = find("meeting in an hour with emma", &ctx).unwrap();
        assert_eq!(m.start, ctx.now + Duration::minutes(AN_HOUR_MINUTES));
    }

    #[test]
    fn soon_is_the_canonical_thirty() {
        let ctx = ctx();
        let m = find("standup soon", &ctx).unwrap();
        assert_eq!(m.start, ctx.now + Duration::minutes(SOON_OFFSET_MINUTES));
    }

    #[test]
    fn right_now_is_now() {
        let ctx = ctx();
        let m = find("deploy right now", &ctx).unwrap();
        assert_eq!(m.start, ctx.now);
    }

    #[test]
    fn leftmost_expression_wins() {
        let ctx = ctx();
        let m = find("in 15 mins or soon after", &ctx).unwrap();
        assert_eq!(m.start, ctx.now + Duration::minutes(15));
    }

    #[test]
    fn duration_clause_in_minutes() {
        let d = find_duration("call in 2 hours for 30 minutes").unwrap();
        assert_eq!(d.seconds, 30 * 60);
    }

    #[test]
    fn duration_clause_for_an_hour() {
        let d = find_duration("workshop at 2pm for an hour").unwrap();
        assert_eq!(d.seconds, 3600);
    }

    #[test]
    fn oversized_offset_is_unresolvable() {
        assert!(find("meet in 999999999999 hours", &ctx()).is_none());
    }

    #[test]
    fn no_relative_expression() {
        assert!(find("dinner tomorrow", &ctx()).is_none());
        assert!(find_duration("dinner tomorrow").is_none());
    }
}
