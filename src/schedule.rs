//! Calendar arithmetic for events: parsing entered dates, the registration
//! cutoff and the reminder window.
//!
//! Stored instants are UTC. Wall-clock input (`dateOnly`, `fromTime`, day
//! filters) is interpreted in the configured event offset.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};

/// Registration closes this many hours before an event starts.
pub const REGISTRATION_CUTOFF_HOURS: i64 = 4;

/// How far ahead the reminder pass looks.
pub const REMINDER_LEAD_HOURS: i64 = 24;

pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn from_local(naive: NaiveDateTime, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Start instant of an event entered as `YYYY-MM-DD` + `HH:MM`.
pub fn event_start(
    date_only: &str,
    from_time: &str,
    offset: &FixedOffset,
) -> Option<DateTime<Utc>> {
    let naive = parse_day(date_only)?.and_time(parse_time(from_time)?);
    from_local(naive, offset)
}

/// Accepts an RFC 3339 instant, a local `YYYY-MM-DDTHH:MM[:SS]`, or a bare
/// `YYYY-MM-DD` (local midnight).
pub fn parse_instant(value: &str, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return from_local(naive, offset);
        }
    }
    parse_day(value).and_then(|day| from_local(day.and_hms_opt(0, 0, 0)?, offset))
}

/// `dateOnly` and `fromTime` strings for an instant, in the event offset.
pub fn local_parts(instant: DateTime<Utc>, offset: &FixedOffset) -> (String, String) {
    let local = instant.with_timezone(offset);
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// First and last instant of a calendar day in the event offset, inclusive.
pub fn day_bounds(day: NaiveDate, offset: &FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = from_local(day.and_hms_opt(0, 0, 0)?, offset)?;
    Some((start, start + Duration::days(1) - Duration::milliseconds(1)))
}

pub fn registration_deadline(start: DateTime<Utc>) -> DateTime<Utc> {
    start - Duration::hours(REGISTRATION_CUTOFF_HOURS)
}

pub fn registration_closed(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > registration_deadline(start)
}

/// The wall-clock hour that begins `REMINDER_LEAD_HOURS` from `now`, inclusive
/// of both ends.
pub fn reminder_window(
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let ahead = now + Duration::hours(REMINDER_LEAD_HOURS);
    let local = ahead.with_timezone(offset);
    let into_hour = Duration::seconds(i64::from(local.minute() * 60 + local.second()))
        + Duration::nanoseconds(i64::from(local.nanosecond()));
    let start = ahead - into_hour;
    (start, start + Duration::hours(1) - Duration::milliseconds(1))
}

pub fn display_datetime(instant: DateTime<Utc>, offset: &FixedOffset) -> String {
    instant.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string()
}

pub fn display_time(instant: DateTime<Utc>, offset: &FixedOffset) -> String {
    instant.with_timezone(offset).format("%H:%M").to_string()
}
