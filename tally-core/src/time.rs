//! Time utilities: timestamp parsing and calendar-aware arithmetic.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Parse an RFC 3339 timestamp, keeping its offset.
/// Returns `None` for anything unparseable.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim()).ok()
}

/// Parse an IANA timezone like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse().map_err(|_| Error::InvalidTimezone(tz.to_string()))
}

/// Whole days from `earlier` to `later`, truncated toward zero.
pub fn whole_days_between(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> i64 {
    (later - earlier).num_days()
}

/// Move a date by calendar months (negative moves back). A day past the end
/// of the target month rolls over into the next one, so Jan 31 + 1 month is
/// Mar 3 (Mar 2 in a leap year).
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = (date.year() * 12 + date.month0() as i32).checked_add(months)?;
    let first = NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)?;
    first.checked_add_days(Days::new(u64::from(date.day0())))
}

/// Advance a date by calendar months, rolling over short months.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    shift_months(date, i32::try_from(months).ok()?)
}

/// The instant `months` calendar months before `now`, evaluated on the
/// wall clock of `tz`.
pub fn months_before(now: DateTime<Utc>, months: u32, tz: Tz) -> Result<DateTime<Utc>> {
    let local = now.with_timezone(&tz).naive_local();
    let shifted = i32::try_from(months)
        .ok()
        .and_then(|m| shift_months(local.date(), -m))
        .map(|date| date.and_time(local.time()))
        .ok_or_else(|| Error::InvalidDate(format!("{local} minus {months} months")))?;

    let local_dt = tz
        .from_local_datetime(&shifted)
        .earliest()
        .ok_or_else(|| Error::InvalidDate(format!("{shifted} does not exist in {tz}")))?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Helper: format a UTC time into RFC3339.
pub fn to_rfc3339_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
