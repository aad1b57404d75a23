// Instant formatting shared by forms, page views and CLI tables
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use std::fmt::Display;

/// Placeholder shown for a missing or unparseable instant
pub const EMPTY: &str = "-";

/// UTC ISO-8601 with millisecond precision and a `Z` suffix
pub fn to_iso_utc<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Combine a `YYYY-MM-DD` date and `HH:MM` time entered in `tz` into a UTC instant
///
/// Ambiguous local times (clock going back) resolve to the earlier instant;
/// nonexistent ones (clock going forward) yield `None`.
pub fn local_to_utc<Tz: TimeZone>(tz: &Tz, date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Zone `minutes` east of UTC, as sent by a browser form; `None` outside ±24h
pub fn fixed_offset(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

/// Date and time form fields for an instant, as seen in `tz`
pub fn split_local<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> (String, String)
where
    Tz::Offset: Display,
{
    let local = instant.with_timezone(tz);
    (local.format("%Y-%m-%d").to_string(), local.format("%H:%M").to_string())
}

/// Medium date plus short time, e.g. `Jan 5, 2025, 9:30 AM`
pub fn format_datetime_in<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    if iso.trim().is_empty() {
        return EMPTY.to_string();
    }
    match DateTime::parse_from_rfc3339(iso.trim()) {
        Ok(instant) => instant.with_timezone(tz).format("%b %-d, %Y, %-I:%M %p").to_string(),
        Err(_) => EMPTY.to_string(),
    }
}

/// `format_datetime_in` for the machine's local zone
pub fn format_local_datetime(iso: &str) -> String {
    format_datetime_in(iso, &Local)
}
