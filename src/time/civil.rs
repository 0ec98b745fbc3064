//! Civil calendar helpers: timezone offsets, local day windows and minute rounding

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use super::{Result, Time, TimeError};

/// Build a fixed UTC offset from a number of hours east of Greenwich
pub fn fixed_offset(offset_hours: f64) -> Result<FixedOffset> {
    let seconds = (offset_hours * 3600.0).round();
    FixedOffset::east_opt(seconds as i32)
        .ok_or_else(|| TimeError::InvalidDate(format!("timezone offset {offset_hours}h")))
}

/// Express a UTC instant in the given timezone
pub fn translate_to_timezone(
    date: DateTime<Utc>,
    offset_hours: f64,
) -> Result<DateTime<FixedOffset>> {
    Ok(date.with_timezone(&fixed_offset(offset_hours)?))
}

/// Round a date-time to the nearest minute, half a minute rounding up.
/// Seconds and sub-seconds are dropped.
pub fn normalize_datetime<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<Tz> {
    let second = i64::from(date.second());
    let nanos = i64::from(date.nanosecond());
    let truncated = date - Duration::seconds(second) - Duration::nanoseconds(nanos);

    if second >= 30 {
        truncated + Duration::minutes(1)
    } else {
        truncated
    }
}

/// UTC instant of local midnight starting `date` in a zone `offset_hours` east of UTC
pub fn local_midnight_utc(date: NaiveDate, offset_hours: f64) -> Result<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TimeError::InvalidDate(date.to_string()))?
        .and_utc();
    let offset = Duration::seconds((offset_hours * 3600.0).round() as i64);
    Ok(midnight - offset)
}

/// Search window covering `days` local days starting at local midnight of `date`
pub fn local_day_window(date: NaiveDate, days: i64, offset_hours: f64) -> Result<(Time, Time)> {
    let start = local_midnight_utc(date, offset_hours)?;
    let end = start + Duration::days(days);
    Ok((Time::from_datetime(&start), Time::from_datetime(&end)))
}

/// Local civil date of a UTC Julian instant, as reported in coverage errors
pub fn local_date(time: &Time, offset_hours: f64) -> Result<NaiveDate> {
    Ok(translate_to_timezone(time.utc_datetime()?, offset_hours)?.date_naive())
}
