//! Reference context: the caller's notion of "now" and "today".
//!
//! Every extraction call receives one immutable [`ReferenceContext`].
//! Building it is where UTC-vs-local ambiguity is broken, *before* any
//! parsing happens: relative expressions ("in 30 minutes") resolve
//! against `now`, day words ("today", "tomorrow") resolve against the
//! civil `today`/`tomorrow` dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::ExtractError;

/// Timezone label used when the caller does not supply one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// The caller-supplied frame against which all relative expressions
/// resolve. Immutable; one per extraction call.
#[derive(Debug, Clone)]
pub struct ReferenceContext {
    /// The caller's wall-clock "now". Authoritative for relative-time
    /// arithmetic: "in 30 minutes" is exactly `now + 30min`.
    pub now: NaiveDateTime,
    /// IANA-style timezone label. Display only; never used for
    /// arithmetic.
    pub timezone: String,
    /// The caller's current civil date.
    pub today: NaiveDate,
    /// Always `today + 1` civil day, computed by calendar arithmetic
    /// (month-length and year rollover included), never by adding 24h to
    /// an instant.
    pub tomorrow: NaiveDate,
}

impl ReferenceContext {
    /// Build a context from whatever the caller supplied.
    ///
    /// - `local_date` is trusted verbatim as `today` when present;
    ///   otherwise `today` is the UTC calendar date of `instant` (or of
    ///   the current instant when that is also absent).
    /// - `now` is `local_date + local_time` when both are present, else
    ///   the instant's UTC wall clock.
    /// - `timezone` defaults to `"UTC"`.
    ///
    /// Pure function of its inputs and the current instant; no side
    /// effects.
    pub fn build(
        local_date: Option<NaiveDate>,
        local_time: Option<NaiveTime>,
        instant: Option<DateTime<Utc>>,
        timezone: Option<&str>,
    ) -> Result<Self, ExtractError> {
        let instant = instant.unwrap_or_else(Utc::now);
        let today = local_date.unwrap_or_else(|| instant.date_naive());
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| ExtractError::InvalidDateArithmetic(format!("no day after {today}")))?;

        let now = match (local_date, local_time) {
            (Some(date), Some(time)) => NaiveDateTime::new(date, time),
            _ => instant.naive_utc(),
        };

        Ok(ReferenceContext {
            now,
            timezone: timezone.unwrap_or(DEFAULT_TIMEZONE).to_string(),
            today,
            tomorrow,
        })
    }

    /// Build a context anchored at an explicit wall-clock datetime, with
    /// `today` taken from its date part. Convenience for CLIs and tests.
    pub fn at(now: NaiveDateTime, timezone: &str) -> Result<Self, ExtractError> {
        let today = now.date();
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| ExtractError::InvalidDateArithmetic(format!("no day after {today}")))?;
        Ok(ReferenceContext { now, timezone: timezone.to_string(), today, tomorrow })
    }
}
