use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::errors::{Error, Result};

/// Parses an IANA timezone name such as `Europe/Paris`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::InvalidConfigValue(format!("unknown timezone '{}'", name)))
}

/// Converts a UTC instant to the calendar date observed in `tz`.
///
/// This is the single source of truth for turning "now" into the date badges
/// are compared against.
pub fn date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's date in the given timezone.
pub fn today_in(tz: Tz) -> NaiveDate {
    date_from_utc(Utc::now(), tz)
}

/// Adds whole calendar months, clamping to the last day of short months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Signed difference in calendar months, ignoring the day of month.
pub fn month_diff(start: NaiveDate, end: NaiveDate) -> i64 {
    (end.year() as i64 - start.year() as i64) * 12 + (end.month() as i64 - start.month() as i64)
}
